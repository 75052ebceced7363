//! Storage locations and the area/bookshelf/layer tree

use std::collections::HashMap;

use validator::Validate;

use crate::{
    error::AppResult,
    models::location::{
        Area, AreaInput, AreaNode, Bookshelf, BookshelfInput, BookshelfNode, BookshelfQuery,
        ShelfLayer, ShelfLayerInput, ShelfLayerNode, ShelfLayerQuery,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct LocationsService {
    repository: Repository,
}

impl LocationsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list_areas(&self) -> AppResult<Vec<Area>> {
        self.repository.locations.areas_list().await
    }

    pub async fn get_area(&self, id: i64) -> AppResult<Area> {
        self.repository.locations.area_get(id).await
    }

    pub async fn create_area(&self, data: AreaInput) -> AppResult<Area> {
        data.validate()?;
        self.repository.locations.area_create(&data).await
    }

    pub async fn update_area(&self, id: i64, data: AreaInput) -> AppResult<Area> {
        data.validate()?;
        self.repository.locations.area_update(id, &data).await
    }

    pub async fn delete_area(&self, id: i64) -> AppResult<()> {
        self.repository.locations.area_delete(id).await
    }

    pub async fn list_bookshelves(&self, query: &BookshelfQuery) -> AppResult<Vec<Bookshelf>> {
        self.repository.locations.bookshelves_list(query).await
    }

    pub async fn get_bookshelf(&self, id: i64) -> AppResult<Bookshelf> {
        self.repository.locations.bookshelf_get(id).await
    }

    pub async fn create_bookshelf(&self, data: BookshelfInput) -> AppResult<Bookshelf> {
        data.validate()?;
        self.repository.locations.bookshelf_create(&data).await
    }

    pub async fn update_bookshelf(&self, id: i64, data: BookshelfInput) -> AppResult<Bookshelf> {
        data.validate()?;
        self.repository.locations.bookshelf_update(id, &data).await
    }

    pub async fn delete_bookshelf(&self, id: i64) -> AppResult<()> {
        self.repository.locations.bookshelf_delete(id).await
    }

    pub async fn list_shelf_layers(&self, query: &ShelfLayerQuery) -> AppResult<Vec<ShelfLayer>> {
        self.repository.locations.shelf_layers_list(query).await
    }

    pub async fn get_shelf_layer(&self, id: i64) -> AppResult<ShelfLayer> {
        self.repository.locations.shelf_layer_get(id).await
    }

    pub async fn create_shelf_layer(&self, data: ShelfLayerInput) -> AppResult<ShelfLayer> {
        data.validate()?;
        self.repository.locations.shelf_layer_create(&data).await
    }

    pub async fn update_shelf_layer(
        &self,
        id: i64,
        data: ShelfLayerInput,
    ) -> AppResult<ShelfLayer> {
        data.validate()?;
        self.repository.locations.shelf_layer_update(id, &data).await
    }

    pub async fn delete_shelf_layer(&self, id: i64) -> AppResult<()> {
        self.repository.locations.shelf_layer_delete(id).await
    }

    /// Full location hierarchy, in store order
    pub async fn tree(&self) -> AppResult<Vec<AreaNode>> {
        let locations = &self.repository.locations;
        let areas = locations.areas_list().await?;
        let shelves = locations.bookshelves_list(&BookshelfQuery::default()).await?;
        let layers = locations.shelf_layers_list(&ShelfLayerQuery::default()).await?;
        Ok(build_location_tree(areas, shelves, layers))
    }
}

/// Nest layers under their bookshelf and bookshelves under their area.
/// Input order is kept at every level; orphans are dropped.
pub fn build_location_tree(
    areas: Vec<Area>,
    shelves: Vec<Bookshelf>,
    layers: Vec<ShelfLayer>,
) -> Vec<AreaNode> {
    let mut layers_by_shelf: HashMap<i64, Vec<ShelfLayerNode>> = HashMap::new();
    for layer in layers {
        layers_by_shelf
            .entry(layer.bookshelf_id)
            .or_default()
            .push(ShelfLayerNode {
                id: layer.id,
                name: layer.name,
            });
    }

    let mut shelves_by_area: HashMap<i64, Vec<BookshelfNode>> = HashMap::new();
    for shelf in shelves {
        let shelf_layers = layers_by_shelf.remove(&shelf.id).unwrap_or_default();
        shelves_by_area
            .entry(shelf.area_id)
            .or_default()
            .push(BookshelfNode {
                id: shelf.id,
                name: shelf.name,
                shelf_layers,
            });
    }

    areas
        .into_iter()
        .map(|area| AreaNode {
            bookshelves: shelves_by_area.remove(&area.id).unwrap_or_default(),
            id: area.id,
            name: area.name,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn area(id: i64, name: &str) -> Area {
        let now = Utc::now();
        Area {
            id,
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn shelf(id: i64, area_id: i64, name: &str) -> Bookshelf {
        let now = Utc::now();
        Bookshelf {
            id,
            area_id,
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn layer(id: i64, bookshelf_id: i64, name: &str) -> ShelfLayer {
        let now = Utc::now();
        ShelfLayer {
            id,
            bookshelf_id,
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_single_branch() {
        let tree = build_location_tree(
            vec![area(1, "A1")],
            vec![shelf(10, 1, "B1")],
            vec![layer(100, 10, "L1")],
        );

        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].name, "A1");
        assert_eq!(tree[0].bookshelves.len(), 1);
        assert_eq!(tree[0].bookshelves[0].name, "B1");
        assert_eq!(tree[0].bookshelves[0].shelf_layers.len(), 1);
        assert_eq!(tree[0].bookshelves[0].shelf_layers[0].name, "L1");
    }

    #[test]
    fn test_keeps_store_order_and_empty_nodes() {
        let tree = build_location_tree(
            vec![area(2, "Second floor"), area(1, "Ground floor")],
            vec![shelf(11, 1, "B2"), shelf(10, 1, "B1")],
            vec![layer(101, 10, "top"), layer(100, 10, "bottom")],
        );

        assert_eq!(tree[0].name, "Second floor");
        assert!(tree[0].bookshelves.is_empty());

        let names: Vec<&str> = tree[1].bookshelves.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["B2", "B1"]);
        assert!(tree[1].bookshelves[0].shelf_layers.is_empty());

        let layers: Vec<&str> = tree[1].bookshelves[1]
            .shelf_layers
            .iter()
            .map(|l| l.name.as_str())
            .collect();
        assert_eq!(layers, vec!["top", "bottom"]);
    }

    #[test]
    fn test_orphans_are_dropped() {
        let tree = build_location_tree(
            vec![],
            vec![shelf(10, 99, "B1")],
            vec![layer(100, 77, "L1")],
        );
        assert!(tree.is_empty());
    }
}
