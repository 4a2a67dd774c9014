use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::auth::models::Principal;
use crate::domain::auth::ports::Clock;
use crate::domain::link::errors::LinkError;
use crate::domain::link::models::AttachOutcome;
use crate::domain::link::models::LinkedPatient;
use crate::domain::link::ports::LinkRepository;
use crate::domain::link::ports::LinkServicePort;
use crate::domain::user::models::Role;
use crate::domain::user::ports::UserRepository;

pub struct LinkService<L, U, C>
where
    L: LinkRepository,
    U: UserRepository,
    C: Clock,
{
    links: Arc<L>,
    users: Arc<U>,
    clock: Arc<C>,
}

impl<L, U, C> LinkService<L, U, C>
where
    L: LinkRepository,
    U: UserRepository,
    C: Clock,
{
    pub fn new(links: Arc<L>, users: Arc<U>, clock: Arc<C>) -> Self {
        Self {
            links,
            users,
            clock,
        }
    }

    fn ensure_roster_access(
        &self,
        principal: &Principal,
        nutritionist_id: i64,
    ) -> Result<(), LinkError> {
        if !principal.has_role(&[Role::Nutritionist, Role::Master]) {
            return Err(LinkError::Forbidden);
        }
        if !principal.can_act_for(Role::Nutritionist, nutritionist_id) {
            return Err(LinkError::NotOwner);
        }
        Ok(())
    }

    async fn ensure_pair_roles(
        &self,
        nutritionist_id: i64,
        patient_id: i64,
    ) -> Result<(), LinkError> {
        let nutritionist = self.users.find_by_id(nutritionist_id).await?;
        if !nutritionist.is_some_and(|u| u.role == Role::Nutritionist) {
            return Err(LinkError::BadNutritionist);
        }

        let patient = self.users.find_by_id(patient_id).await?;
        if !patient.is_some_and(|u| u.role == Role::Patient) {
            return Err(LinkError::BadPatient);
        }

        Ok(())
    }
}

#[async_trait]
impl<L, U, C> LinkServicePort for LinkService<L, U, C>
where
    L: LinkRepository,
    U: UserRepository,
    C: Clock,
{
    async fn list_patients(
        &self,
        principal: &Principal,
        nutritionist_id: i64,
    ) -> Result<Vec<LinkedPatient>, LinkError> {
        self.ensure_roster_access(principal, nutritionist_id)?;
        self.links.list_patients(nutritionist_id).await
    }

    async fn attach(
        &self,
        principal: &Principal,
        nutritionist_id: i64,
        patient_id: i64,
    ) -> Result<AttachOutcome, LinkError> {
        self.ensure_roster_access(principal, nutritionist_id)?;
        self.ensure_pair_roles(nutritionist_id, patient_id).await?;

        if self.links.exists(nutritionist_id, patient_id).await? {
            return Ok(AttachOutcome::AlreadyLinked);
        }

        self.links
            .insert(nutritionist_id, patient_id, self.clock.now())
            .await?;

        tracing::info!(nutritionist_id, patient_id, "patient linked");

        Ok(AttachOutcome::Created)
    }

    async fn detach(
        &self,
        principal: &Principal,
        nutritionist_id: i64,
        patient_id: i64,
    ) -> Result<(), LinkError> {
        self.ensure_roster_access(principal, nutritionist_id)?;
        self.links.delete(nutritionist_id, patient_id).await
    }
}
