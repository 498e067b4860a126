//! Input forms.
//!
//! Each form is a plain deserializable struct with a static field table and a
//! `clean` step that turns raw input into typed values or a [`FieldErrors`]
//! map. Simple per-field constraints are declared with `validator`; money,
//! cross-field and collection rules live in `clean`.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::money::{Money, Quantity};

/// Forms whose only input is a tenant-unique `name`.
macro_rules! name_form {
    ($(#[$meta:meta])* $form:ident, $key:literal, $placeholder:literal) => {
        $(#[$meta])*
        #[derive(serde::Deserialize, serde::Serialize, Debug, Clone, Default, validator::Validate)]
        #[serde(default)]
        pub struct $form {
            #[validate(length(max = 100, message = "Ensure this value has at most 100 characters."))]
            pub name: String,
        }

        impl $crate::forms::Form for $form {
            const NAME: &'static str = $key;
            const FIELDS: &'static [$crate::forms::FieldMeta] = &[$crate::forms::FieldMeta::required(
                "name",
                "Name",
                $crate::forms::FieldKind::Text,
            )
            .with_placeholder($placeholder)];
            type Cleaned = String;

            fn clean(&self) -> Result<String, $crate::forms::FieldErrors> {
                use validator::Validate;

                let mut errors = match self.validate() {
                    Ok(()) => $crate::forms::FieldErrors::default(),
                    Err(e) => $crate::forms::FieldErrors::from(e),
                };
                $crate::forms::require_text(&mut errors, "name", &self.name);
                errors.finish(|| self.name.trim().to_owned())
            }
        }
    };
}

pub mod caffe;
pub mod cash;
pub mod hours;
pub mod reports;

pub const REQUIRED: &str = "This field is required.";

/// Field name → human-readable messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Adds `other` with every field name prefixed by `prefix.`.
    pub fn merge_prefixed(&mut self, prefix: &str, other: FieldErrors) {
        for (field, messages) in other.0 {
            let key = format!("{}.{}", prefix, field);
            self.0.entry(key).or_default().extend(messages);
        }
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// `Ok(value)` when no errors were collected.
    pub fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }

    fn collect(&mut self, prefix: Option<&str>, errors: &ValidationErrors) {
        for (field, kind) in errors.errors() {
            let key = match prefix {
                Some(prefix) => format!("{}.{}", prefix, field),
                None => field.to_string(),
            };
            match kind {
                ValidationErrorsKind::Field(list) => {
                    for error in list {
                        let message = error
                            .message
                            .clone()
                            .unwrap_or_else(|| Cow::Owned(error.code.to_string()));
                        self.add(&key, message);
                    }
                }
                ValidationErrorsKind::Struct(nested) => self.collect(Some(&key), nested),
                ValidationErrorsKind::List(items) => {
                    for (index, nested) in items {
                        self.collect(Some(&format!("{}.{}", key, index)), nested);
                    }
                }
            }
        }
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FieldErrors::default();
        out.collect(None, &errors);
        out
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    LongText,
    Email,
    Password,
    Money,
    Quantity,
    Time,
    Date,
    Choice,
    MultipleChoice,
    Collection,
}

/// Static description of one form field, served to the front end.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldMeta {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<&'static str>,
}

impl FieldMeta {
    pub const fn required(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: true,
            placeholder: None,
        }
    }

    pub const fn optional(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
            placeholder: None,
        }
    }

    pub const fn with_placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }
}

pub trait Form {
    /// Key under which the field table is published.
    const NAME: &'static str;
    const FIELDS: &'static [FieldMeta];
    type Cleaned;

    fn clean(&self) -> Result<Self::Cleaned, FieldErrors>;
}

/// Field table of the form published as `name`.
pub fn field_table(name: &str) -> Option<&'static [FieldMeta]> {
    macro_rules! lookup {
        ($($form:ty),+ $(,)?) => {
            $(
                if name == <$form as Form>::NAME {
                    return Some(<$form as Form>::FIELDS);
                }
            )+
        };
    }

    lookup!(
        caffe::CaffeForm,
        caffe::EmployeeForm,
        caffe::LoginForm,
        cash::CompanyForm,
        cash::ExpenseForm,
        cash::LineItemForm,
        cash::CashReportForm,
        reports::CategoryForm,
        reports::UnitForm,
        reports::ProductForm,
        reports::FullProductForm,
        reports::ReportForm,
        reports::StencilForm,
        reports::StencilReportForm,
        hours::PositionForm,
        hours::WorkedHoursForm,
    );
    None
}

/// Presence check for free-text fields; length limits are declared with
/// `validator`.
pub(crate) fn require_text(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, REQUIRED);
    }
}

pub(crate) fn require_id(errors: &mut FieldErrors, field: &str, value: Option<i64>) -> Option<i64> {
    if value.is_none() {
        errors.add(field, REQUIRED);
    }
    value
}

pub(crate) fn require_money(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<Decimal>,
) -> Option<Money> {
    let Some(value) = value else {
        errors.add(field, REQUIRED);
        return None;
    };
    match Money::non_negative(value) {
        Ok(money) => Some(money),
        Err(e) => {
            errors.add(field, e.to_string());
            None
        }
    }
}

pub(crate) fn require_quantity(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<Decimal>,
) -> Option<Quantity> {
    let Some(value) = value else {
        errors.add(field, REQUIRED);
        return None;
    };
    match Quantity::new(value) {
        Ok(quantity) => Some(quantity),
        Err(e) => {
            errors.add(field, e.to_string());
            None
        }
    }
}
