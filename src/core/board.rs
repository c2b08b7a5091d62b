use crate::core::{BoardCommand, SortField, Vehicle, VehiclePatch, VehicleSource};
use std::cmp::Ordering;

/// In-memory, ordered vehicle list shared by the card list and the map overlay.
#[derive(Debug, Clone, Default)]
pub struct VehicleBoard {
    vehicles: Vec<Vehicle>,
    sorted_by: Option<SortField>,
}

impl VehicleBoard {
    pub fn new(vehicles: Vec<Vehicle>) -> Self {
        Self {
            vehicles,
            sorted_by: None,
        }
    }

    /// Fetch from `source`. A failed fetch is logged and leaves the board empty.
    pub async fn load<S: VehicleSource + ?Sized>(source: &S) -> Self {
        match source.fetch_vehicles().await {
            Ok(vehicles) => {
                tracing::info!("Fetched {} vehicles", vehicles.len());
                Self::new(vehicles)
            }
            Err(e) => {
                tracing::error!("Error fetching vehicles: {}", e);
                Self::default()
            }
        }
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn into_vehicles(self) -> Vec<Vehicle> {
        self.vehicles
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// Field of the most recent sort, if any.
    pub fn sorted_by(&self) -> Option<SortField> {
        self.sorted_by
    }

    /// Stable ascending sort on `field`.
    pub fn sort_by(&mut self, field: SortField) {
        self.sorted_by = Some(field);
        self.vehicles.sort_by(|a, b| compare_by(field, a, b));
        tracing::debug!("Sorted {} vehicles by {}", self.vehicles.len(), field);
    }

    /// Merge `patch` into the vehicles whose id matches. Returns how many changed.
    pub fn edit(&mut self, id: u64, patch: &VehiclePatch) -> usize {
        let mut changed = 0;
        for vehicle in self.vehicles.iter_mut().filter(|v| v.id == id) {
            patch.apply_to(vehicle);
            changed += 1;
        }
        if changed == 0 {
            tracing::debug!("Edit skipped: no vehicle with id {}", id);
        }
        changed
    }

    /// Remove the vehicles whose id matches, keeping the rest in order. Returns how many went.
    pub fn delete(&mut self, id: u64) -> usize {
        let before = self.vehicles.len();
        self.vehicles.retain(|v| v.id != id);
        let removed = before - self.vehicles.len();
        if removed == 0 {
            tracing::debug!("Delete skipped: no vehicle with id {}", id);
        }
        removed
    }

    /// Returns the number of vehicles the command touched.
    pub fn apply(&mut self, command: &BoardCommand) -> usize {
        match command {
            BoardCommand::Sort(field) => {
                self.sort_by(*field);
                self.vehicles.len()
            }
            BoardCommand::Edit { id, patch } => self.edit(*id, patch),
            BoardCommand::Delete { id } => self.delete(*id),
        }
    }

    pub fn apply_all<'a, I>(&mut self, commands: I)
    where
        I: IntoIterator<Item = &'a BoardCommand>,
    {
        for command in commands {
            let touched = self.apply(command);
            tracing::info!("Applied '{}' ({} vehicles affected)", command, touched);
        }
    }
}

/// Ascending order on a single sort field.
pub fn compare_by(field: SortField, a: &Vehicle, b: &Vehicle) -> Ordering {
    match field {
        SortField::Year => a.year.cmp(&b.year),
        SortField::Price => a.price.total_cmp(&b.price),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::{BoardError, Result};
    use async_trait::async_trait;

    fn vehicle(id: u64, year: i32, price: f64) -> Vehicle {
        Vehicle {
            id,
            name: format!("Car {}", id),
            model: format!("Model {}", id),
            year,
            color: "black".to_string(),
            price,
            latitude: 55.7 + id as f64 / 100.0,
            longitude: 37.6,
        }
    }

    fn board() -> VehicleBoard {
        VehicleBoard::new(vec![
            vehicle(1, 2018, 15000.0),
            vehicle(2, 2015, 30000.0),
            vehicle(3, 2020, 12000.0),
            vehicle(4, 2015, 9000.0),
        ])
    }

    fn ids(board: &VehicleBoard) -> Vec<u64> {
        board.vehicles().iter().map(|v| v.id).collect()
    }

    #[test]
    fn test_sort_by_year_is_non_decreasing_and_stable() {
        let mut board = board();
        board.sort_by(SortField::Year);

        assert!(board.vehicles().windows(2).all(|w| w[0].year <= w[1].year));
        // 2 與 4 同年份，維持原本順序
        assert_eq!(ids(&board), vec![2, 4, 1, 3]);
        assert_eq!(board.sorted_by(), Some(SortField::Year));
    }

    #[test]
    fn test_sort_by_price() {
        let mut board = board();
        board.sort_by(SortField::Price);

        assert!(board.vehicles().windows(2).all(|w| w[0].price <= w[1].price));
        assert_eq!(ids(&board), vec![4, 3, 1, 2]);
    }

    #[test]
    fn test_edit_changes_only_matching_vehicle() {
        let mut board = board();
        let untouched: Vec<Vehicle> = board
            .vehicles()
            .iter()
            .filter(|v| v.id != 3)
            .cloned()
            .collect();

        let patch = VehiclePatch {
            name: Some("Volga".to_string()),
            price: Some(5000.0),
            ..Default::default()
        };
        assert_eq!(board.edit(3, &patch), 1);

        let edited = board.vehicles().iter().find(|v| v.id == 3).unwrap();
        assert_eq!(edited.name, "Volga");
        assert_eq!(edited.price, 5000.0);
        assert_eq!(edited.year, 2020);

        let others: Vec<Vehicle> = board
            .vehicles()
            .iter()
            .filter(|v| v.id != 3)
            .cloned()
            .collect();
        assert_eq!(others, untouched);
        assert_eq!(ids(&board), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_edit_unknown_id_is_noop() {
        let mut board = board();
        let before = board.vehicles().to_vec();
        let patch = VehiclePatch {
            color: Some("white".to_string()),
            ..Default::default()
        };
        assert_eq!(board.edit(99, &patch), 0);
        assert_eq!(board.vehicles(), before.as_slice());
    }

    #[test]
    fn test_delete_removes_one_and_keeps_order() {
        let mut board = board();
        assert_eq!(board.delete(2), 1);
        assert_eq!(ids(&board), vec![1, 3, 4]);
        assert_eq!(board.delete(2), 0);
        assert_eq!(board.len(), 3);
    }

    #[test]
    fn test_apply_all_runs_in_order() {
        let mut board = board();
        let commands: Vec<BoardCommand> = ["sort:price", "delete:3", "edit:1:price=1"]
            .iter()
            .map(|c| c.parse().unwrap())
            .collect();
        board.apply_all(&commands);

        // 編輯發生在排序之後，不會重新排序
        assert_eq!(ids(&board), vec![4, 1, 2]);
        assert_eq!(board.vehicles()[1].price, 1.0);
        assert_eq!(board.sorted_by(), Some(SortField::Price));
    }

    #[test]
    fn test_compare_by_matches_sort() {
        let a = vehicle(1, 2010, 100.0);
        let b = vehicle(2, 2012, 50.0);
        assert_eq!(compare_by(SortField::Year, &a, &b), Ordering::Less);
        assert_eq!(compare_by(SortField::Price, &a, &b), Ordering::Greater);
    }

    struct FailingSource;

    #[async_trait]
    impl VehicleSource for FailingSource {
        async fn fetch_vehicles(&self) -> Result<Vec<Vehicle>> {
            Err(BoardError::UpstreamStatusError { status: 502 })
        }
    }

    struct FixedSource(Vec<Vehicle>);

    #[async_trait]
    impl VehicleSource for FixedSource {
        async fn fetch_vehicles(&self) -> Result<Vec<Vehicle>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_load_failure_yields_empty_board() {
        let board = tokio_test::block_on(VehicleBoard::load(&FailingSource));
        assert!(board.is_empty());
        assert_eq!(board.sorted_by(), None);
    }

    #[tokio::test]
    async fn test_load_keeps_source_order() {
        let source = FixedSource(vec![vehicle(5, 2001, 1.0), vehicle(2, 1999, 2.0)]);
        let board = VehicleBoard::load(&source).await;
        assert_eq!(ids(&board), vec![5, 2]);
    }
}
