use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{require_text, FieldErrors, FieldKind, FieldMeta, Form, REQUIRED};

lazy_static! {
    pub static ref POSTAL_CODE: Regex = Regex::new(r"^[0-9]{2}-?[0-9]{3}$").unwrap();
}

const SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{}|;':\",.<>?/";

#[derive(Deserialize, Serialize, Debug, Clone, Default, Validate)]
#[serde(default)]
pub struct CaffeForm {
    #[validate(length(max = 100, message = "Ensure this value has at most 100 characters."))]
    pub name: String,
    #[validate(length(max = 100, message = "Ensure this value has at most 100 characters."))]
    pub city: String,
    #[validate(length(max = 100, message = "Ensure this value has at most 100 characters."))]
    pub street: String,
    #[validate(regex(
        path = *POSTAL_CODE,
        message = "Postal code must be in the format XX-XXX."
    ))]
    pub postal_code: String,
    #[validate(length(max = 10, message = "Ensure this value has at most 10 characters."))]
    pub house_number: String,
    #[validate(length(max = 10, message = "Ensure this value has at most 10 characters."))]
    pub building_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanCaffe {
    pub name: String,
    pub city: String,
    pub street: String,
    pub postal_code: String,
    pub house_number: String,
    pub building_number: String,
}

impl Form for CaffeForm {
    const NAME: &'static str = "caffe";
    const FIELDS: &'static [FieldMeta] = &[
        FieldMeta::required("name", "Caffe name", FieldKind::Text),
        FieldMeta::required("city", "City", FieldKind::Text),
        FieldMeta::required("street", "Street", FieldKind::Text),
        FieldMeta::required("postal_code", "Postal code", FieldKind::Text)
            .with_placeholder("44-100"),
        FieldMeta::optional("building_number", "Building number", FieldKind::Text),
        FieldMeta::optional("house_number", "Apartment number", FieldKind::Text),
    ];
    type Cleaned = CleanCaffe;

    fn clean(&self) -> Result<CleanCaffe, FieldErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::default(),
            Err(e) => FieldErrors::from(e),
        };
        require_text(&mut errors, "name", &self.name);
        require_text(&mut errors, "city", &self.city);
        require_text(&mut errors, "street", &self.street);

        errors.finish(|| CleanCaffe {
            name: self.name.trim().to_owned(),
            city: self.city.trim().to_owned(),
            street: self.street.trim().to_owned(),
            postal_code: self.postal_code.clone(),
            house_number: self.house_number.trim().to_owned(),
            building_number: self.building_number.trim().to_owned(),
        })
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, Validate)]
#[serde(default)]
pub struct EmployeeForm {
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub username: String,
    #[validate(length(max = 30, message = "Ensure this value has at most 30 characters."))]
    pub first_name: String,
    #[validate(length(max = 30, message = "Ensure this value has at most 30 characters."))]
    pub last_name: String,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[validate(length(max = 20, message = "Ensure this value has at most 20 characters."))]
    pub telephone_number: String,
    #[validate(length(max = 50, message = "Ensure this value has at most 50 characters."))]
    pub favorite_coffee: String,
    /// Required for new accounts; on edit an empty value keeps the old one.
    pub password: Option<String>,
    pub password2: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanEmployee {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub telephone_number: String,
    pub favorite_coffee: String,
    pub password: Option<String>,
}

impl EmployeeForm {
    /// Validation for a new account, which must come with a password.
    pub fn clean_new(&self) -> Result<CleanEmployee, FieldErrors> {
        let mut errors = match self.clean() {
            Ok(cleaned) if cleaned.password.is_some() => return Ok(cleaned),
            Ok(_) => FieldErrors::default(),
            Err(errors) => errors,
        };
        if !errors.contains("password") {
            errors.add("password", REQUIRED);
        }
        Err(errors)
    }
}

impl Form for EmployeeForm {
    const NAME: &'static str = "employee";
    const FIELDS: &'static [FieldMeta] = &[
        FieldMeta::required("username", "Username", FieldKind::Text),
        FieldMeta::required("first_name", "First name", FieldKind::Text),
        FieldMeta::required("last_name", "Last name", FieldKind::Text),
        FieldMeta::required("telephone_number", "Telephone number", FieldKind::Text),
        FieldMeta::required("email", "Email address", FieldKind::Email),
        FieldMeta::optional("favorite_coffee", "Your favorite coffee?", FieldKind::Text),
        FieldMeta::required("password", "Password", FieldKind::Password),
        FieldMeta::required("password2", "Password confirmation", FieldKind::Password),
    ];
    type Cleaned = CleanEmployee;

    fn clean(&self) -> Result<CleanEmployee, FieldErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::default(),
            Err(e) => FieldErrors::from(e),
        };
        require_text(&mut errors, "username", &self.username);
        require_text(&mut errors, "first_name", &self.first_name);
        require_text(&mut errors, "last_name", &self.last_name);
        require_text(&mut errors, "telephone_number", &self.telephone_number);
        if self.email.trim().is_empty() && !errors.contains("email") {
            errors.add("email", REQUIRED);
        }

        let password = self.password.as_deref().filter(|p| !p.is_empty());
        if let Some(password) = password {
            check_password(
                &mut errors,
                password,
                self.password2.as_deref().unwrap_or_default(),
            );
        }

        errors.finish(|| CleanEmployee {
            username: self.username.trim().to_lowercase(),
            first_name: self.first_name.trim().to_owned(),
            last_name: self.last_name.trim().to_owned(),
            email: self.email.trim().to_lowercase(),
            telephone_number: self.telephone_number.trim().to_owned(),
            favorite_coffee: self.favorite_coffee.trim().to_owned(),
            password: password.map(str::to_owned),
        })
    }
}

/// Password policy for every account: 12 to 128 characters mixing digits,
/// letters and special characters, entered twice.
pub fn check_password(errors: &mut FieldErrors, password: &str, password2: &str) {
    if password != password2 {
        errors.add("password2", "Passwords do not match");
    }
    let length = password.chars().count();
    if length < 12 {
        errors.add("password", "Password must be at least 12 characters long");
    }
    if length > 128 {
        errors.add("password", "Password must be at most 128 characters long");
    }
    if !password.chars().any(|c| c.is_ascii_digit())
        || !password.chars().any(|c| c.is_alphabetic())
        || !password.chars().any(|c| SPECIAL_CHARS.contains(c))
    {
        errors.add(
            "password",
            "Password must contain at least one number, one letter and one special character",
        );
    }
}

/// A new café together with the account of its first employee.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct RegisterForm {
    pub caffe: CaffeForm,
    pub employee: EmployeeForm,
}

impl RegisterForm {
    pub fn clean(&self) -> Result<(CleanCaffe, CleanEmployee), FieldErrors> {
        let mut errors = FieldErrors::default();
        let caffe = self
            .caffe
            .clean()
            .map_err(|e| errors.merge_prefixed("caffe", e))
            .ok();
        let employee = self
            .employee
            .clean_new()
            .map_err(|e| errors.merge_prefixed("employee", e))
            .ok();

        match (caffe, employee) {
            (Some(caffe), Some(employee)) if errors.is_empty() => Ok((caffe, employee)),
            _ => Err(errors),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl Form for LoginForm {
    const NAME: &'static str = "login";
    const FIELDS: &'static [FieldMeta] = &[
        FieldMeta::required("username", "Username", FieldKind::Text),
        FieldMeta::required("password", "Password", FieldKind::Password),
    ];
    type Cleaned = (String, String);

    fn clean(&self) -> Result<(String, String), FieldErrors> {
        let mut errors = FieldErrors::default();
        require_text(&mut errors, "username", &self.username);
        if self.password.is_empty() {
            errors.add("password", REQUIRED);
        }
        errors.finish(|| (self.username.trim().to_lowercase(), self.password.clone()))
    }
}
