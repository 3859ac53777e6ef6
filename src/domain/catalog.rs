//! Read-only table of monitored cities, built once at startup and shared
//! behind an `Arc`.

use std::collections::HashMap;

use crate::domain::model::{CityDefinition, Region};
use crate::utils::error::{Result, StatsError};

/// Lowercase ASCII slug. Accented letters are transliterated ("Köln" is
/// `koln`), every other run of characters becomes one `-`.
pub fn slugify(name: &str) -> String {
    slug::slugify(name)
}

/// `query` characters appear in `target` in order.
fn fuzzy_matches(query: &str, target: &str) -> bool {
    let mut remaining = target.chars();
    query.chars().all(|q| remaining.any(|t| t == q))
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogNeighborhood {
    pub slug: String,
    pub name: String,
    pub region: Region,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogCity {
    pub slug: String,
    pub city: CityDefinition,
    pub neighborhoods: Vec<CatalogNeighborhood>,
}

impl CatalogCity {
    pub fn region(&self) -> Region {
        self.city.region()
    }

    pub fn has_neighborhoods(&self) -> bool {
        !self.neighborhoods.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegionCatalog {
    cities: Vec<CatalogCity>,
    by_slug: HashMap<String, usize>,
}

impl RegionCatalog {
    /// Cities are unique by slug; the first definition wins.
    pub fn new(definitions: Vec<CityDefinition>) -> Self {
        let mut catalog = Self::default();
        for city in definitions {
            let slug = slugify(&city.name);
            if slug.is_empty() {
                tracing::warn!("Skipping city with unusable name {:?}", city.name);
                continue;
            }
            if catalog.by_slug.contains_key(&slug) {
                tracing::warn!("Duplicate city '{}' ignored", city.name);
                continue;
            }
            let neighborhoods = city
                .neighborhoods
                .iter()
                .map(|n| CatalogNeighborhood {
                    slug: slugify(&n.name),
                    name: n.name.clone(),
                    region: n.region(),
                })
                .collect();
            catalog.by_slug.insert(slug.clone(), catalog.cities.len());
            catalog.cities.push(CatalogCity {
                slug,
                city,
                neighborhoods,
            });
        }
        tracing::debug!("Region catalog holds {} cities", catalog.cities.len());
        catalog
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogCity> {
        self.cities.iter()
    }

    /// Looks a city up by name or slug.
    pub fn get(&self, name: &str) -> Option<&CatalogCity> {
        self.by_slug.get(&slugify(name)).map(|&i| &self.cities[i])
    }

    pub fn search(&self, query: &str, has_neighborhoods: bool) -> Result<Vec<&CatalogCity>> {
        let query = slugify(query);
        if query.is_empty() {
            return Err(StatsError::ValidationError {
                message: "'q' parameter must not be empty.".to_string(),
            });
        }
        Ok(self
            .cities
            .iter()
            .filter(|c| !has_neighborhoods || c.has_neighborhoods())
            .filter(|c| fuzzy_matches(&query, &c.slug))
            .collect())
    }
}
