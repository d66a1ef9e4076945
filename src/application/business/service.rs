//! Business (tenant) management

use std::sync::Arc;

use tracing::info;

use crate::domain::{
    Actor, Business, BusinessDraft, DomainError, DomainResult, RepositoryProvider,
};
use crate::shared::{is_plausible_email, PaginatedResult, PaginationParams};

pub struct BusinessService {
    repos: Arc<dyn RepositoryProvider>,
}

impl BusinessService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    /// Platform admins only
    pub async fn create(&self, actor: &Actor, draft: BusinessDraft) -> DomainResult<Business> {
        actor.require_admin()?;
        validate_draft(&draft)?;

        let business = Business::new(draft);
        self.repos.businesses().insert(business.clone()).await?;

        info!(business_id = %business.id, slug = %business.slug, "Business created");
        Ok(business)
    }

    pub async fn get(&self, actor: &Actor, id: &str) -> DomainResult<Business> {
        actor.authorize_business(id)?;
        self.load(id).await
    }

    /// Admins see every business, everybody else only their own.
    pub async fn list(
        &self,
        actor: &Actor,
        pagination: PaginationParams,
    ) -> DomainResult<PaginatedResult<Business>> {
        if actor.is_admin() {
            return self.repos.businesses().list(pagination).await;
        }

        let own = match actor.business_id.as_deref() {
            Some(id) => self
                .repos
                .businesses()
                .find_by_id(id)
                .await?
                .filter(|b| b.deleted_at.is_none()),
            None => None,
        };
        let items: Vec<Business> = own.into_iter().collect();
        let total = items.len() as u64;
        Ok(PaginatedResult::new(items, total, 1, pagination.limit))
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: &str,
        draft: BusinessDraft,
    ) -> DomainResult<Business> {
        actor.authorize_management(id)?;
        validate_draft(&draft)?;

        let mut business = self.load(id).await?;
        business.apply(draft);
        self.repos.businesses().update(business.clone()).await?;

        info!(business_id = %id, "Business updated");
        Ok(business)
    }

    pub async fn delete(&self, actor: &Actor, id: &str) -> DomainResult<()> {
        actor.require_admin()?;
        self.load(id).await?;
        self.repos.businesses().soft_delete(id).await?;

        info!(business_id = %id, "Business deleted");
        Ok(())
    }

    async fn load(&self, id: &str) -> DomainResult<Business> {
        self.repos
            .businesses()
            .find_by_id(id)
            .await?
            .filter(|b| b.deleted_at.is_none())
            .ok_or_else(|| DomainError::not_found("Business", id))
    }
}

fn validate_draft(draft: &BusinessDraft) -> DomainResult<()> {
    if draft.name.trim().is_empty() {
        return Err(DomainError::Validation("Business name is required".into()));
    }
    let slug_ok = !draft.slug.is_empty()
        && draft.slug.len() <= 64
        && draft
            .slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !draft.slug.starts_with('-')
        && !draft.slug.ends_with('-');
    if !slug_ok {
        return Err(DomainError::Validation(format!(
            "Invalid slug '{}': use lowercase letters, digits and inner hyphens",
            draft.slug
        )));
    }
    if let Some(email) = draft.email.as_deref() {
        if !is_plausible_email(email) {
            return Err(DomainError::Validation(format!("Invalid email: {}", email)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;
    use crate::infrastructure::storage::InMemoryRepositoryProvider;

    fn actor(role: UserRole, business_id: Option<&str>) -> Actor {
        Actor {
            user_id: "u".into(),
            username: "u".into(),
            role,
            business_id: business_id.map(String::from),
        }
    }

    fn draft(slug: &str) -> BusinessDraft {
        BusinessDraft {
            name: "Hotel Sol".into(),
            slug: slug.into(),
            email: Some("info@sol.example".into()),
            phone: None,
            address: None,
            is_active: true,
        }
    }

    fn service() -> BusinessService {
        BusinessService::new(Arc::new(InMemoryRepositoryProvider::new()))
    }

    #[tokio::test]
    async fn only_admins_create() {
        let svc = service();
        let owner = actor(UserRole::Owner, Some("x"));
        assert!(matches!(
            svc.create(&owner, draft("sol")).await,
            Err(DomainError::Forbidden(_))
        ));

        let admin = actor(UserRole::Admin, None);
        svc.create(&admin, draft("sol")).await.unwrap();
        assert!(matches!(
            svc.create(&admin, draft("sol")).await,
            Err(DomainError::Conflict(_))
        ));
        assert!(matches!(
            svc.create(&admin, draft("Bad Slug")).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn non_admins_list_only_their_business() {
        let svc = service();
        let admin = actor(UserRole::Admin, None);
        let sol = svc.create(&admin, draft("sol")).await.unwrap();
        svc.create(&admin, draft("luna")).await.unwrap();

        assert_eq!(
            svc.list(&admin, PaginationParams::default()).await.unwrap().total,
            2
        );

        let staff = actor(UserRole::Staff, Some(sol.id.as_str()));
        let own = svc.list(&staff, PaginationParams::default()).await.unwrap();
        assert_eq!(own.total, 1);
        assert_eq!(own.items[0].id, sol.id);
    }

    #[tokio::test]
    async fn deleted_business_is_gone() {
        let svc = service();
        let admin = actor(UserRole::Admin, None);
        let sol = svc.create(&admin, draft("sol")).await.unwrap();

        svc.delete(&admin, &sol.id).await.unwrap();
        assert!(svc.get(&admin, &sol.id).await.unwrap_err().is_not_found());
        assert!(svc.delete(&admin, &sol.id).await.unwrap_err().is_not_found());
    }
}
