//! Attribute parsing for `#[native(...)]`.

use syn::{Attribute, LitStr};

/// Parsed `#[native(...)]` attributes on a type.
#[derive(Debug, Default)]
pub struct TypeAttrs {
    /// Override name for scripts (default: Rust struct name)
    pub name: Option<String>,
    /// Skip by-value conversions
    pub opaque: bool,
}

/// Parsed `#[native(...)]` attributes on a field.
#[derive(Debug, Default)]
pub struct FieldAttrs {
    /// Generate getter
    pub get: bool,
    /// Generate setter
    pub set: bool,
    /// Override member name
    pub name: Option<String>,
}

impl FieldAttrs {
    /// Whether the field is exposed at all.
    pub fn is_bound(&self) -> bool {
        self.get || self.set
    }
}

fn is_native(attr: &Attribute) -> bool {
    attr.path().is_ident("native")
}

impl TypeAttrs {
    /// Parse attributes from a list of `#[native(...)]` attributes.
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut result = Self::default();

        for attr in attrs.iter().filter(|attr| is_native(attr)) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let value: LitStr = meta.value()?.parse()?;
                    if value.value().is_empty() {
                        return Err(syn::Error::new(value.span(), "class name cannot be empty"));
                    }
                    result.name = Some(value.value());
                } else if meta.path.is_ident("opaque") {
                    result.opaque = true;
                } else {
                    return Err(meta.error(format!(
                        "unknown native attribute: {}",
                        meta.path.get_ident().map(|i| i.to_string()).unwrap_or_default()
                    )));
                }
                Ok(())
            })?;
        }

        Ok(result)
    }
}

impl FieldAttrs {
    /// Parse attributes from a list of `#[native(...)]` attributes.
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut result = Self::default();

        for attr in attrs.iter().filter(|attr| is_native(attr)) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("get") {
                    result.get = true;
                } else if meta.path.is_ident("set") {
                    result.set = true;
                } else if meta.path.is_ident("name") {
                    let value: LitStr = meta.value()?.parse()?;
                    if value.value().is_empty() {
                        return Err(syn::Error::new(value.span(), "member name cannot be empty"));
                    }
                    result.name = Some(value.value());
                } else {
                    return Err(meta.error(format!(
                        "unknown native field attribute: {}",
                        meta.path.get_ident().map(|i| i.to_string()).unwrap_or_default()
                    )));
                }
                Ok(())
            })?;
        }

        Ok(result)
    }
}
