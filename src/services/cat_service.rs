use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::Principal;
use crate::bbox;
use crate::database::models::{Cat, CatOutput, CatUpdate, NewCat, User};
use crate::database::store::{CatFilter, Store};
use crate::validation::{validate_cat_update, validate_new_cat, ValidationErrors};

use super::{ServiceError, ServiceResult};

/// Cat listings, the area query and owner / admin mutations
pub struct CatService {
    store: Arc<dyn Store>,
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn cat_not_found(id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("Cat '{}' not found", id))
}

impl CatService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Render cats with their owners populated
    pub async fn present(&self, cats: &[Cat]) -> ServiceResult<Vec<CatOutput>> {
        let mut ids: Vec<Uuid> = cats.iter().map(|c| c.owner).collect();
        ids.sort();
        ids.dedup();

        let owners: HashMap<Uuid, User> = self
            .store
            .find_users(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        Ok(cats
            .iter()
            .map(|cat| cat.output(owners.get(&cat.owner)))
            .collect())
    }

    pub async fn present_one(&self, cat: &Cat) -> ServiceResult<CatOutput> {
        let owner = self.store.find_user(cat.owner).await?;
        Ok(cat.output(owner.as_ref()))
    }

    pub async fn list(&self) -> ServiceResult<Vec<Cat>> {
        Ok(self.store.find_cats(&CatFilter::All).await?)
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<Cat> {
        self.store.find_cat(id).await?.ok_or_else(|| cat_not_found(id))
    }

    pub async fn by_owner(&self, principal: &Principal) -> ServiceResult<Vec<Cat>> {
        Ok(self.store.find_cats(&CatFilter::Owner(principal.id)).await?)
    }

    /// Cats inside the rectangle spanned by two `"<lat>,<lng>"` corners.
    /// An empty match is reported as not found.
    pub async fn within_area(&self, top_right: &str, bottom_left: &str) -> ServiceResult<Vec<Cat>> {
        let region = bbox::region_from_query(top_right, bottom_left)?;
        let cats = self.store.find_cats(&CatFilter::Within(region)).await?;
        if cats.is_empty() {
            return Err(ServiceError::NotFound("No cats found".to_string()));
        }
        Ok(cats)
    }

    pub async fn create(&self, principal: &Principal, input: NewCat) -> ServiceResult<Cat> {
        validate_new_cat(&input, today())?;
        let cat = self.store.insert_cat(principal.id, input).await?;
        tracing::info!("User {} created cat {}", principal.id, cat.id);
        Ok(cat)
    }

    /// Owner-only update; reassigning the owner is reserved for admins
    pub async fn update(&self, principal: &Principal, id: Uuid, update: CatUpdate) -> ServiceResult<Cat> {
        let cat = self.get(id).await?;
        if !principal.owns(cat.owner) {
            return Err(ServiceError::Forbidden("Only the owner can modify this cat".to_string()));
        }
        if update.owner.is_some_and(|owner| owner != cat.owner) {
            return Err(ServiceError::Forbidden("Only an admin can change a cat's owner".to_string()));
        }
        validate_cat_update(&update, today())?;

        self.store.update_cat(id, update).await?.ok_or_else(|| cat_not_found(id))
    }

    pub async fn delete(&self, principal: &Principal, id: Uuid) -> ServiceResult<Cat> {
        let cat = self.get(id).await?;
        if !principal.owns(cat.owner) {
            return Err(ServiceError::Forbidden("Only the owner can delete this cat".to_string()));
        }
        self.store.delete_cat(id).await?.ok_or_else(|| cat_not_found(id))
    }

    pub async fn admin_update(&self, principal: &Principal, id: Uuid, update: CatUpdate) -> ServiceResult<Cat> {
        require_admin(principal)?;
        validate_cat_update(&update, today())?;
        if let Some(owner) = update.owner {
            if self.store.find_user(owner).await?.is_none() {
                return Err(ValidationErrors::single("owner", "must reference an existing user").into());
            }
        }

        let cat = self.store.update_cat(id, update).await?.ok_or_else(|| cat_not_found(id))?;
        tracing::info!("Admin {} modified cat {}", principal.id, cat.id);
        Ok(cat)
    }

    pub async fn admin_delete(&self, principal: &Principal, id: Uuid) -> ServiceResult<Cat> {
        require_admin(principal)?;
        let cat = self.store.delete_cat(id).await?.ok_or_else(|| cat_not_found(id))?;
        tracing::info!("Admin {} deleted cat {}", principal.id, cat.id);
        Ok(cat)
    }
}

fn require_admin(principal: &Principal) -> ServiceResult<()> {
    if principal.is_admin() {
        Ok(())
    } else {
        Err(ServiceError::Forbidden("Admin access required".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::database::models::{GeoPoint, NewUserRecord, OwnerRef, Role};

    struct Fixture {
        cats: CatService,
        owner: Principal,
        other: Principal,
        admin: Principal,
    }

    async fn fixture() -> Fixture {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let mut principals = Vec::new();
        for (email, role) in [
            ("owner@example.com", Role::User),
            ("other@example.com", Role::User),
            ("admin@example.com", Role::Admin),
        ] {
            let user = store
                .insert_user(NewUserRecord {
                    user_name: email.split('@').next().unwrap().to_string(),
                    email: email.to_string(),
                    role,
                    password_hash: "hash".to_string(),
                })
                .await
                .unwrap();
            principals.push(user.principal());
        }
        Fixture {
            cats: CatService::new(store),
            owner: principals[0],
            other: principals[1],
            admin: principals[2],
        }
    }

    fn cat_at(name: &str, lng: f64, lat: f64) -> NewCat {
        NewCat {
            cat_name: name.to_string(),
            weight: 4.2,
            filename: format!("{}.jpg", name),
            birthdate: NaiveDate::from_ymd_opt(2020, 5, 17).unwrap(),
            location: GeoPoint::new(lng, lat),
        }
    }

    #[tokio::test]
    async fn area_query_returns_only_cats_inside() {
        let f = fixture().await;
        let inside = f.cats.create(&f.owner, cat_at("inside", 16.0, 7.0)).await.unwrap();
        f.cats.create(&f.owner, cat_at("outside", 30.0, 30.0)).await.unwrap();

        let found = f.cats.within_area("10.5,20.25", "5,15").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, inside.id);
    }

    #[tokio::test]
    async fn empty_area_is_not_found() {
        let f = fixture().await;
        f.cats.create(&f.owner, cat_at("far", 30.0, 30.0)).await.unwrap();
        let result = f.cats.within_area("10.5,20.25", "5,15").await;
        assert!(matches!(result, Err(ServiceError::NotFound(ref m)) if m == "No cats found"));
    }

    #[tokio::test]
    async fn bad_corner_is_a_bounds_error() {
        let f = fixture().await;
        let result = f.cats.within_area("abc,20", "5,15").await;
        assert!(matches!(result, Err(ServiceError::Bounds(_))));
    }

    #[tokio::test]
    async fn only_owner_may_update_or_delete() {
        let f = fixture().await;
        let cat = f.cats.create(&f.owner, cat_at("miri", 16.0, 7.0)).await.unwrap();
        let update = CatUpdate {
            weight: Some(5.0),
            ..CatUpdate::default()
        };

        let denied = f.cats.update(&f.other, cat.id, update.clone()).await;
        assert!(matches!(denied, Err(ServiceError::Forbidden(_))));
        assert!(matches!(f.cats.delete(&f.other, cat.id).await, Err(ServiceError::Forbidden(_))));

        let updated = f.cats.update(&f.owner, cat.id, update).await.unwrap();
        assert_eq!(updated.weight, 5.0);
        f.cats.delete(&f.owner, cat.id).await.unwrap();
        assert!(matches!(f.cats.get(cat.id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn owner_cannot_reassign_cat() {
        let f = fixture().await;
        let cat = f.cats.create(&f.owner, cat_at("miri", 16.0, 7.0)).await.unwrap();
        let update = CatUpdate {
            owner: Some(f.other.id),
            ..CatUpdate::default()
        };
        let result = f.cats.update(&f.owner, cat.id, update).await;
        assert!(matches!(result, Err(ServiceError::Forbidden(_))));
    }

    #[tokio::test]
    async fn admin_may_reassign_to_existing_user_only() {
        let f = fixture().await;
        let cat = f.cats.create(&f.owner, cat_at("miri", 16.0, 7.0)).await.unwrap();

        let to_other = CatUpdate {
            owner: Some(f.other.id),
            ..CatUpdate::default()
        };
        assert!(matches!(
            f.cats.admin_update(&f.owner, cat.id, to_other.clone()).await,
            Err(ServiceError::Forbidden(_))
        ));
        let moved = f.cats.admin_update(&f.admin, cat.id, to_other).await.unwrap();
        assert_eq!(moved.owner, f.other.id);

        let to_ghost = CatUpdate {
            owner: Some(Uuid::new_v4()),
            ..CatUpdate::default()
        };
        assert!(matches!(
            f.cats.admin_update(&f.admin, cat.id, to_ghost).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn admin_delete_of_missing_cat_is_not_found() {
        let f = fixture().await;
        let result = f.cats.admin_delete(&f.admin, Uuid::new_v4()).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn present_populates_owner() {
        let f = fixture().await;
        let cat = f.cats.create(&f.owner, cat_at("miri", 16.0, 7.0)).await.unwrap();
        let output = f.cats.present(&[cat]).await.unwrap();
        match &output[0].owner {
            OwnerRef::User(user) => assert_eq!(user.id, f.owner.id),
            other => panic!("owner not populated: {:?}", other),
        }
    }

    #[tokio::test]
    async fn future_birthdate_is_rejected() {
        let f = fixture().await;
        let mut cat = cat_at("future", 16.0, 7.0);
        cat.birthdate = today() + chrono::Duration::days(2);
        let result = f.cats.create(&f.owner, cat).await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }
}
