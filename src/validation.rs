//! Request body validation for users and cats

use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;

use crate::bbox::Coordinate;
use crate::database::models::{CatUpdate, GeoPoint, NewCat, NewUser, UserUpdate};

pub const MIN_USER_NAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 5;

/// Per-field validation messages
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors {
    fields: HashMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &HashMap<String, String> {
        &self.fields
    }

    pub fn into_fields(self) -> HashMap<String, String> {
        self.fields
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<_> = self.fields.iter().collect();
        entries.sort();
        let joined: Vec<String> = entries
            .into_iter()
            .map(|(field, msg)| format!("{}: {}", msg, field))
            .collect();
        f.write_str(&joined.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Emails are compared case-insensitively and stored lowercased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn check_user_name(errors: &mut ValidationErrors, user_name: &str) {
    if user_name.trim().chars().count() < MIN_USER_NAME_LEN {
        errors.add(
            "user_name",
            format!("must be at least {} characters", MIN_USER_NAME_LEN),
        );
    }
}

fn check_email(errors: &mut ValidationErrors, email: &str) {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && !email.contains(char::is_whitespace)
                && domain
                    .split_once('.')
                    .map(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
                    .unwrap_or(false)
        }
        None => false,
    };
    if !valid {
        errors.add("email", "must be a valid email address");
    }
}

fn check_password(errors: &mut ValidationErrors, password: &str) {
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.add(
            "password",
            format!("must be at least {} characters", MIN_PASSWORD_LEN),
        );
    }
}

fn check_cat_name(errors: &mut ValidationErrors, cat_name: &str) {
    if cat_name.trim().is_empty() {
        errors.add("cat_name", "must not be empty");
    }
}

fn check_weight(errors: &mut ValidationErrors, weight: f64) {
    if !weight.is_finite() || weight <= 0.0 {
        errors.add("weight", "must be a positive number");
    }
}

fn check_filename(errors: &mut ValidationErrors, filename: &str) {
    if filename.trim().is_empty() {
        errors.add("filename", "must not be empty");
    }
}

fn check_birthdate(errors: &mut ValidationErrors, birthdate: NaiveDate, today: NaiveDate) {
    if birthdate > today {
        errors.add("birthdate", "must not be in the future");
    }
}

fn check_location(errors: &mut ValidationErrors, location: &GeoPoint) {
    let coordinate = Coordinate::new(location.lat(), location.lng());
    if let Err(e) = coordinate.resolve("location") {
        errors.add("location", e.to_string());
    }
}

pub fn validate_new_user(user: &NewUser) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    check_user_name(&mut errors, &user.user_name);
    check_email(&mut errors, &user.email);
    check_password(&mut errors, &user.password);
    errors.into_result()
}

pub fn validate_user_update(update: &UserUpdate) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if let Some(user_name) = &update.user_name {
        check_user_name(&mut errors, user_name);
    }
    if let Some(email) = &update.email {
        check_email(&mut errors, email);
    }
    if let Some(password) = &update.password {
        check_password(&mut errors, password);
    }
    errors.into_result()
}

pub fn validate_new_cat(cat: &NewCat, today: NaiveDate) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    check_cat_name(&mut errors, &cat.cat_name);
    check_weight(&mut errors, cat.weight);
    check_filename(&mut errors, &cat.filename);
    check_birthdate(&mut errors, cat.birthdate, today);
    check_location(&mut errors, &cat.location);
    errors.into_result()
}

pub fn validate_cat_update(update: &CatUpdate, today: NaiveDate) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if let Some(cat_name) = &update.cat_name {
        check_cat_name(&mut errors, cat_name);
    }
    if let Some(weight) = update.weight {
        check_weight(&mut errors, weight);
    }
    if let Some(filename) = &update.filename {
        check_filename(&mut errors, filename);
    }
    if let Some(birthdate) = update.birthdate {
        check_birthdate(&mut errors, birthdate, today);
    }
    if let Some(location) = &update.location {
        check_location(&mut errors, location);
    }
    errors.into_result()
}
