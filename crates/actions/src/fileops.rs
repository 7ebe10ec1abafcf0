use tracing::debug;

use storegate_protocol::messages::{CreateContainerRequest, DeleteRequest, MoveRequest, StatRequest};
use storegate_protocol::{Reference, ResourceInfo};
use storegate_session::{Session, check_rpc_status};

use crate::error::ActionError;
use crate::paths;

/// Single-call file operations: stat, create, move, remove.
#[derive(Debug, Clone, Copy)]
pub struct FileOperationsAction<'a> {
    session: &'a Session,
}

impl<'a> FileOperationsAction<'a> {
    /// Fails unless `session` is logged in.
    pub fn new(session: &'a Session) -> Result<Self, ActionError> {
        session.gateway()?;
        Ok(Self { session })
    }

    /// Queries the metadata of `path`.
    pub async fn stat(&self, path: &str) -> Result<ResourceInfo, ActionError> {
        let (gateway, ctx) = self.session.gateway()?;
        let req = StatRequest {
            reference: Reference::path(path),
        };
        let resp = ctx.run(gateway.stat(ctx, req)).await?;
        check_rpc_status("querying resource information", &resp.status)?;
        resp.info.ok_or_else(|| ActionError::NotFound(path.to_string()))
    }

    /// Stats `path`, mapping "not found" to `None`.
    async fn try_stat(&self, path: &str) -> Result<Option<ResourceInfo>, ActionError> {
        match self.stat(path).await {
            Ok(info) => Ok(Some(info)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn resource_exists(&self, path: &str) -> Result<bool, ActionError> {
        Ok(self.try_stat(path).await?.is_some())
    }

    pub async fn file_exists(&self, path: &str) -> Result<bool, ActionError> {
        Ok(self.try_stat(path).await?.is_some_and(|i| i.is_file()))
    }

    pub async fn dir_exists(&self, path: &str) -> Result<bool, ActionError> {
        Ok(self.try_stat(path).await?.is_some_and(|i| i.is_container()))
    }

    /// Creates every missing directory along `path`.
    ///
    /// Fails with [`ActionError::NotADirectory`] if a component exists but
    /// is not a container.
    pub async fn make_path(&self, path: &str) -> Result<(), ActionError> {
        for dir in paths::ancestors_inclusive(path) {
            match self.try_stat(&dir).await? {
                Some(info) if info.is_container() => continue,
                Some(_) => return Err(ActionError::NotADirectory(dir)),
                None => self.create_container(&dir).await?,
            }
        }
        Ok(())
    }

    async fn create_container(&self, path: &str) -> Result<(), ActionError> {
        let (gateway, ctx) = self.session.gateway()?;
        let req = CreateContainerRequest {
            reference: Reference::path(path),
        };
        let resp = ctx.run(gateway.create_container(ctx, req)).await?;
        check_rpc_status("creating container", &resp.status)?;
        debug!(%path, "container created");
        Ok(())
    }

    /// Moves `source` to `target`; the target must not exist yet.
    pub async fn move_resource(&self, source: &str, target: &str) -> Result<(), ActionError> {
        if !self.resource_exists(source).await? {
            return Err(ActionError::NotFound(source.to_string()));
        }
        if self.resource_exists(target).await? {
            return Err(ActionError::AlreadyExists(target.to_string()));
        }

        let (gateway, ctx) = self.session.gateway()?;
        let req = MoveRequest {
            source: Reference::path(source),
            destination: Reference::path(target),
        };
        let resp = ctx.run(gateway.move_resource(ctx, req)).await?;
        check_rpc_status("moving resource", &resp.status)?;
        debug!(%source, %target, "resource moved");
        Ok(())
    }

    /// Moves `source` into `dir`, creating it first and keeping the base name.
    pub async fn move_to(&self, source: &str, dir: &str) -> Result<String, ActionError> {
        self.make_path(dir).await?;
        let target = paths::join(dir, paths::base_name(source));
        self.move_resource(source, &target).await?;
        Ok(target)
    }

    pub async fn remove(&self, path: &str) -> Result<(), ActionError> {
        let (gateway, ctx) = self.session.gateway()?;
        let req = DeleteRequest {
            reference: Reference::path(path),
        };
        let resp = ctx.run(gateway.delete(ctx, req)).await?;
        check_rpc_status("removing resource", &resp.status)?;
        debug!(%path, "resource removed");
        Ok(())
    }
}
