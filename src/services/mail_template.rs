use crate::config::ACTIVATION_LINK_PLACEHOLDER;

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Mail template is missing the {{activation_link}} placeholder")]
    MissingPlaceholder,
}

/// Substitutes the activation link into the body template. The template
/// must contain the `{activation_link}` placeholder at least once; every
/// occurrence is replaced.
pub fn render_activation_body(
    template: &str,
    activation_link: &str,
) -> Result<String, TemplateError> {
    if !template.contains(ACTIVATION_LINK_PLACEHOLDER) {
        return Err(TemplateError::MissingPlaceholder);
    }

    Ok(template.replace(ACTIVATION_LINK_PLACEHOLDER, activation_link))
}
