use storegate_protocol::messages::ListContainerRequest;
use storegate_protocol::{Reference, ResourceInfo, ResourceType};
use storegate_session::{Session, check_rpc_status};

use crate::error::ActionError;

/// Directory listings built on the list-container call.
#[derive(Debug, Clone, Copy)]
pub struct EnumFilesAction<'a> {
    session: &'a Session,
}

impl<'a> EnumFilesAction<'a> {
    /// Fails unless `session` is logged in.
    pub fn new(session: &'a Session) -> Result<Self, ActionError> {
        session.gateway()?;
        Ok(Self { session })
    }

    async fn list_container(&self, path: &str) -> Result<Vec<ResourceInfo>, ActionError> {
        let (gateway, ctx) = self.session.gateway()?;
        let req = ListContainerRequest {
            reference: Reference::path(path),
        };
        let resp = ctx.run(gateway.list_container(ctx, req)).await?;
        check_rpc_status("listing container", &resp.status)?;
        Ok(resp.infos)
    }

    /// Lists `path`, descending into subdirectories when `recursive`.
    ///
    /// Entries of types other than file, container, reference and symlink
    /// are skipped.
    pub async fn list_all(
        &self,
        path: &str,
        recursive: bool,
    ) -> Result<Vec<ResourceInfo>, ActionError> {
        let mut entries = Vec::new();
        let mut pending = vec![path.to_string()];
        while let Some(dir) = pending.pop() {
            for info in self.list_container(&dir).await? {
                if !info.resource_type.is_listable() {
                    continue;
                }
                if recursive && info.is_container() {
                    pending.push(info.path.clone());
                }
                entries.push(info);
            }
        }
        Ok(entries)
    }

    /// Like [`list_all`](Self::list_all) but keeps only entries matching `filter`.
    pub async fn list_all_with_filter<F>(
        &self,
        path: &str,
        recursive: bool,
        filter: F,
    ) -> Result<Vec<ResourceInfo>, ActionError>
    where
        F: Fn(&ResourceInfo) -> bool,
    {
        let mut entries = self.list_all(path, recursive).await?;
        entries.retain(|info| filter(info));
        Ok(entries)
    }

    /// Files and symlinks under `path`.
    pub async fn list_files(
        &self,
        path: &str,
        recursive: bool,
    ) -> Result<Vec<ResourceInfo>, ActionError> {
        self.list_all_with_filter(path, recursive, |info| {
            matches!(
                info.resource_type,
                ResourceType::File | ResourceType::Symlink
            )
        })
        .await
    }

    /// Directories under `path`.
    pub async fn list_dirs(
        &self,
        path: &str,
        recursive: bool,
    ) -> Result<Vec<ResourceInfo>, ActionError> {
        self.list_all_with_filter(path, recursive, ResourceInfo::is_container)
            .await
    }
}
