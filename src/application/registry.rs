// Card registry - the closed-at-startup set of card types
use indexmap::IndexMap;

use crate::application::card_type::{CardTypeDescriptor, CardTypeInfo};
use crate::error::{DashboardError, Result};

#[derive(Debug, Default)]
pub struct CardRegistry {
    types: IndexMap<String, CardTypeDescriptor>,
}

impl CardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, descriptor: CardTypeDescriptor) -> Result<()> {
        if self.types.contains_key(&descriptor.name) {
            return Err(DashboardError::DuplicateType(descriptor.name));
        }
        tracing::debug!("Registered card type {}", descriptor.name);
        self.types.insert(descriptor.name.clone(), descriptor);
        Ok(())
    }

    pub fn resolve(&self, type_name: &str) -> Result<&CardTypeDescriptor> {
        self.types
            .get(type_name)
            .ok_or_else(|| DashboardError::UnknownType(type_name.to_string()))
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// Registered types in registration order
    pub fn list_types(&self) -> Vec<CardTypeInfo> {
        self.types.values().map(CardTypeDescriptor::info).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CardTypeDescriptor> {
        self.types.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::card_type::{CardRenderer, RenderContext};
    use crate::domain::settings::Settings;
    use crate::domain::view::{CardBody, CardView, EditorView};

    struct Blank;

    impl CardRenderer for Blank {
        fn render(&self, ctx: &RenderContext<'_>, _settings: &Settings) -> Result<CardView> {
            Ok(CardView {
                card_id: ctx.card_id.clone(),
                title: String::new(),
                subtitle: String::new(),
                body: CardBody::Error { message: String::new() },
            })
        }

        fn render_settings(&self, ctx: &RenderContext<'_>, _settings: &Settings) -> Result<EditorView> {
            Ok(EditorView {
                card_id: ctx.card_id.clone(),
                controls: Vec::new(),
            })
        }
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = CardRegistry::new();
        registry.register(CardTypeDescriptor::new("blank", "Blank", Blank)).unwrap();
        let err = registry
            .register(CardTypeDescriptor::new("blank", "Other", Blank))
            .unwrap_err();
        assert!(matches!(err, DashboardError::DuplicateType(name) if name == "blank"));
        assert_eq!(registry.resolve("blank").unwrap().title, "Blank");
    }

    #[test]
    fn test_unknown_type() {
        let registry = CardRegistry::new();
        assert!(matches!(registry.resolve("pie"), Err(DashboardError::UnknownType(_))));
    }

    #[test]
    fn test_list_is_insertion_ordered() {
        let mut registry = CardRegistry::new();
        for name in ["zeta", "alpha", "mid"] {
            registry.register(CardTypeDescriptor::new(name, name, Blank)).unwrap();
        }
        let names: Vec<_> = registry.list_types().into_iter().map(|t| t.name).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }
}
