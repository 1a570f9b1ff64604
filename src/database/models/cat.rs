use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::point::GeoPoint;
use super::user::{User, UserOutput};

#[derive(Debug, Clone, PartialEq)]
pub struct Cat {
    pub id: Uuid,
    pub cat_name: String,
    pub weight: f64,
    pub filename: String,
    pub birthdate: NaiveDate,
    pub location: GeoPoint,
    pub owner: Uuid,
}

impl Cat {
    /// Render with the owner populated when it could be resolved.
    pub fn output(&self, owner: Option<&User>) -> CatOutput {
        let owner = match owner {
            Some(user) if user.id == self.owner => OwnerRef::User(user.output()),
            _ => OwnerRef::Id(self.owner),
        };
        CatOutput {
            id: self.id,
            cat_name: self.cat_name.clone(),
            weight: self.weight,
            filename: self.filename.clone(),
            birthdate: self.birthdate,
            location: self.location,
            owner,
        }
    }
}

/// Creation body. The owner always comes from the authenticated principal.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCat {
    pub cat_name: String,
    pub weight: f64,
    pub filename: String,
    pub birthdate: NaiveDate,
    pub location: GeoPoint,
}

/// Partial update; `owner` is only honoured on the admin route.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatUpdate {
    pub cat_name: Option<String>,
    pub weight: Option<f64>,
    pub filename: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub location: Option<GeoPoint>,
    pub owner: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OwnerRef {
    User(UserOutput),
    Id(Uuid),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatOutput {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub cat_name: String,
    pub weight: f64,
    pub filename: String,
    pub birthdate: NaiveDate,
    pub location: GeoPoint,
    pub owner: OwnerRef,
}
