//! Driving service for user edits.
//!
//! Inbound adapters call this service rather than building jobs. It loads
//! the target user, gates the request with
//! [`EditUserJob::can_edit_anything`], and runs the composite through the
//! dispatcher.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::ports::AuthorizationChecker;
use crate::domain::{
    AccessDenied, ChangeLogSession, EditUserJob, JobArguments, JobContext, JobDispatcher,
    JobError, JobKind, Principal, User, UserId, UserJobPorts,
};

/// One edit request.
#[derive(Debug, Clone)]
pub struct EditUserRequest {
    /// Acting principal.
    pub principal: Principal,
    /// Account to edit.
    pub target_id: UserId,
    /// Requested field values.
    pub arguments: JobArguments,
}

impl EditUserRequest {
    /// Build a request for `principal` to edit `target_id`.
    pub fn new(principal: Principal, target_id: UserId, arguments: JobArguments) -> Self {
        Self {
            principal,
            target_id,
            arguments,
        }
    }
}

/// User edit service implementing the driving operations.
#[derive(Clone)]
pub struct UserEditService {
    ports: UserJobPorts,
    dispatcher: JobDispatcher,
}

impl UserEditService {
    /// Create a service over the given ports and authorisation policy.
    pub fn new(ports: UserJobPorts, checker: Arc<dyn AuthorizationChecker>) -> Self {
        Self {
            ports,
            dispatcher: JobDispatcher::new(checker),
        }
    }

    fn load(&self, id: &UserId) -> Result<User, JobError> {
        self.ports
            .users
            .find_by_id(id)?
            .ok_or_else(|| JobError::NotFound { id: id.clone() })
    }

    fn composite(&self, context: JobContext, principal: &Principal) -> EditUserJob {
        EditUserJob::new(
            context,
            JobArguments::new(),
            principal.clone(),
            self.ports.clone(),
            self.dispatcher.clone(),
        )
    }

    /// Whether `principal` may change at least one field of the target.
    pub fn can_edit_anything(
        &self,
        principal: &Principal,
        target_id: &UserId,
    ) -> Result<bool, JobError> {
        let target = self.load(target_id)?;
        Ok(self
            .composite(JobContext::Normal, principal)
            .can_edit_anything(principal, &target))
    }

    /// Apply one edit and commit it.
    ///
    /// # Errors
    /// Returns [`JobError::NotFound`] for an unknown target, a denial when the
    /// principal may edit nothing or is refused a requested field, and any
    /// validation or adapter failure. Nothing is committed on error.
    pub fn edit_user(&self, request: EditUserRequest) -> Result<User, JobError> {
        let user = self.load(&request.target_id)?;
        let (user, _) = self.edit_in(JobContext::Normal, request, user)?;
        Ok(user)
    }

    /// Apply several edits as one batch.
    ///
    /// Requests naming the same user build on each other's result, and each
    /// edited user is returned once, in first-request order. Users are saved
    /// together and the change log is flushed once, only after every edit
    /// succeeded and no two users claim the same name.
    pub fn edit_users_in_batch(
        &self,
        requests: Vec<EditUserRequest>,
    ) -> Result<Vec<User>, JobError> {
        let mut users: Vec<User> = Vec::new();
        let mut batch = self.ports.change_log.buffer_changes();
        for request in requests {
            let index = users
                .iter()
                .position(|user| user.id() == &request.target_id);
            let current = match index.and_then(|index| users.get(index)) {
                Some(user) => user.clone(),
                None => self.load(&request.target_id)?,
            };
            let (user, changes) = self.edit_in(JobContext::BatchEdit, request, current)?;
            ensure_name_unclaimed(&users, &user)?;
            batch.absorb(changes);
            match index.and_then(|index| users.get_mut(index)) {
                Some(slot) => *slot = user,
                None => users.push(user),
            }
        }

        self.ports.users.save_all(&users)?;
        let entries = batch.len();
        self.ports.change_log.flush(batch)?;
        info!(users = users.len(), entries, "user batch committed");
        Ok(users)
    }

    fn edit_in(
        &self,
        context: JobContext,
        request: EditUserRequest,
        mut user: User,
    ) -> Result<(User, ChangeLogSession), JobError> {
        let EditUserRequest {
            principal,
            target_id,
            arguments,
        } = request;
        let mut job = self.composite(context, &principal);
        if !job.can_edit_anything(&principal, &user) {
            debug!(target = %target_id, "principal may not edit any field");
            return Err(AccessDenied::new(format!("cannot edit user {target_id}")).into());
        }

        let mut changes = ChangeLogSession::default();
        self.dispatcher
            .run(&mut job, &arguments, &mut user, &mut changes)?;
        Ok((user, changes))
    }
}

/// Reject `edited` when another user of the same batch already holds its name.
fn ensure_name_unclaimed(batch: &[User], edited: &User) -> Result<(), JobError> {
    let clash = batch
        .iter()
        .any(|other| other.id() != edited.id() && other.name().matches(edited.name()));
    if clash {
        return Err(JobError::invalid_argument(
            JobKind::Name,
            format!("user name {} is already used in this batch", edited.name()),
        ));
    }
    Ok(())
}
