use std::path::Path;
use std::str::FromStr;
use std::sync::RwLock;

use bigdecimal::BigDecimal;

use crate::domain::errors::DomainError;
use crate::domain::menu::MenuItem;
use crate::domain::order::{RestaurantSettings, SettingsUpdate};
use crate::domain::ports::RestaurantRepository;

pub struct InMemoryRestaurantRepository {
    menu: Vec<MenuItem>,
    settings: RwLock<RestaurantSettings>,
}

impl InMemoryRestaurantRepository {
    pub fn new(menu: Vec<MenuItem>, settings: RestaurantSettings) -> Self {
        Self {
            menu,
            settings: RwLock::new(settings),
        }
    }

    /// Loads the menu from a JSON array of items.
    pub fn from_menu_file(
        path: impl AsRef<Path>,
        settings: RestaurantSettings,
    ) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DomainError::Internal(format!("cannot read menu file {}: {}", path.display(), e))
        })?;
        let menu: Vec<MenuItem> = serde_json::from_str(&raw).map_err(|e| {
            DomainError::InvalidInput(format!("menu file {} is not valid: {}", path.display(), e))
        })?;
        log::info!("Loaded {} menu items from {}", menu.len(), path.display());
        Ok(Self::new(menu, settings))
    }
}

impl RestaurantRepository for InMemoryRestaurantRepository {
    fn menu(&self) -> Result<Vec<MenuItem>, DomainError> {
        Ok(self
            .menu
            .iter()
            .filter(|item| item.is_available)
            .cloned()
            .collect())
    }

    fn settings(&self) -> Result<RestaurantSettings, DomainError> {
        Ok(self.settings.read()?.clone())
    }

    fn update_settings(&self, update: &SettingsUpdate) -> Result<RestaurantSettings, DomainError> {
        let mut settings = self.settings.write()?;
        update.apply_to(&mut settings);
        Ok(settings.clone())
    }
}

/// Menu served when no menu file is configured.
pub fn default_menu() -> Vec<MenuItem> {
    let item = |id: i64, name: &str, description: &str, price: &str, category: &str| MenuItem {
        id,
        name: name.to_string(),
        description: description.to_string(),
        price: BigDecimal::from_str(price).unwrap_or_default(),
        category: category.to_string(),
        image_url: None,
        is_available: true,
    };
    vec![
        item(1, "Chicken Adobo", "Braised in soy, vinegar and garlic", "120.00", "rice-meals"),
        item(2, "Pork Sisig", "Sizzling chopped pork with calamansi", "140.00", "rice-meals"),
        item(3, "Pancit Canton", "Stir-fried egg noodles with vegetables", "95.00", "noodles"),
        item(4, "Turon", "Banana spring roll with caramel", "35.00", "snacks"),
        item(5, "Iced Tea", "House-brewed, lightly sweetened", "40.00", "drinks"),
    ]
}
