//! Form widgets which can show the value previously submitted and any error
//! attached to the field.

use hypertext::prelude::*;

/// Validation messages keyed by field name, in the order they were found.
#[derive(Default, Debug)]
pub struct FieldErrors {
    errors: Vec<(&'static str, String)>,
}

impl FieldErrors {
    pub fn add(&mut self, field: &'static str, msg: impl Into<String>) {
        self.errors.push((field, msg.into()));
    }

    /// Records the error (if any) from a validator.
    pub fn check(&mut self, field: &'static str, result: Result<(), String>) {
        if let Err(msg) = result {
            self.add(field, msg);
        }
    }

    pub fn has(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// The first error recorded against a field.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, msg)| msg.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

pub struct FormField<'a> {
    pub label: &'a str,
    pub name: &'a str,
    pub kind: &'a str,
    pub value: &'a str,
    pub error: Option<&'a str>,
}

impl Renderable for FormField<'_> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        let class = if self.error.is_some() {
            "form-control is-invalid"
        } else {
            "form-control"
        };

        maud! {
            div class="mb-3" {
                label for=(self.name) class="form-label" { (self.label) }
                input type=(self.kind)
                      class=(class)
                      id=(self.name)
                      name=(self.name)
                      value=(self.value);
                @if let Some(error) = self.error {
                    div class="invalid-feedback" { (error) }
                }
            }
        }
        .render_to(buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_error_wins() {
        let mut errors = FieldErrors::default();
        assert!(errors.is_empty());
        errors.check("email", Ok(()));
        assert!(errors.is_empty());
        errors.add("email", "first");
        errors.add("email", "second");
        assert_eq!(errors.get("email"), Some("first"));
        assert!(!errors.has("password1"));
    }

    #[test]
    fn field_shows_error_and_value() {
        let html = FormField {
            label: "Email",
            name: "email",
            kind: "email",
            value: "jane@example.com",
            error: Some("Enter a valid email address."),
        }
        .render()
        .into_inner();

        assert!(html.contains("is-invalid"));
        assert!(html.contains("jane@example.com"));
        assert!(html.contains("Enter a valid email address."));
    }
}
