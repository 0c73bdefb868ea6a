//! Unit tests for ms-spatial.
//!
//! All tests use small hand-built spaces.

#[cfg(test)]
mod region {
    use ms_core::CellId;

    use crate::{CellIndex, Region};

    #[test]
    fn duplicate_indices_are_kept() {
        let mut r = Region::new();
        let idx = CellIndex::new(1, 1);
        r.add(idx, CellId(0));
        r.add(idx, CellId(1));

        assert_eq!(r.len(), 2);
        assert_eq!(r.index_count(), 1);
        assert_eq!(r.find_all(idx), &[CellId(0), CellId(1)]);
    }

    #[test]
    fn find_returns_first_inserted_match() {
        let mut r = Region::new();
        let idx = CellIndex::new(0, 3);
        r.add(idx, CellId(7));
        r.add(idx, CellId(2));
        assert_eq!(r.find(idx), Some(CellId(7)));
        // Stable across repeated lookups.
        assert_eq!(r.find(idx), r.find(idx));
    }

    #[test]
    fn find_absent_is_none() {
        let r = Region::new();
        assert_eq!(r.find(CellIndex::new(0, 0)), None);
        assert!(r.find_all(CellIndex::new(0, 0)).is_empty());
    }

    #[test]
    fn erase_removes_exactly_one_duplicate() {
        let mut r = Region::new();
        let idx = CellIndex::new(4, 4);
        r.add(idx, CellId(0));
        r.add(idx, CellId(1));

        assert!(r.erase(idx, CellId(0)));
        assert_eq!(r.len(), 1);
        assert_eq!(r.find(idx), Some(CellId(1)));

        // Erasing the same pair again is a miss.
        assert!(!r.erase(idx, CellId(0)));
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn erase_index_removes_all() {
        let mut r = Region::new();
        let idx = CellIndex::new(0, 0);
        r.add(idx, CellId(0));
        r.add(idx, CellId(1));
        r.add(CellIndex::new(1, 0), CellId(2));
        assert_eq!(r.erase_index(idx), 2);
        assert_eq!(r.len(), 1);
        assert!(!r.contains_index(idx));
    }

    #[test]
    fn iteration_is_index_then_insertion_order() {
        let r: Region = [
            (CellIndex::new(1, 0), CellId(10)),
            (CellIndex::new(0, 1), CellId(11)),
            (CellIndex::new(0, 1), CellId(12)),
            (CellIndex::new(0, 0), CellId(13)),
        ]
        .into_iter()
        .collect();
        let order: Vec<CellId> = r.cells().collect();
        assert_eq!(order, vec![CellId(13), CellId(11), CellId(12), CellId(10)]);
    }

    #[test]
    fn remove_cell_by_value() {
        let mut r = Region::new();
        r.add(CellIndex::new(2, 2), CellId(5));
        assert!(r.remove_cell(CellId(5)));
        assert!(r.is_empty());
        assert!(!r.remove_cell(CellId(5)));
    }
}

#[cfg(test)]
mod neighborhood {
    use ms_core::CellId;

    use crate::{CellIndex, Neighborhood};

    #[test]
    fn add_defaults_weight_to_zero() {
        let mut n = Neighborhood::new(CellId(0));
        n.add(CellIndex::new(1, 0), CellId(1));
        assert_eq!(n.weight(CellIndex::new(1, 0)), Some(0.0));
    }

    #[test]
    fn set_weight_and_erase() {
        let mut n = Neighborhood::new(CellId(0));
        let idx = CellIndex::new(0, 1);
        n.add_weighted(idx, CellId(3), 0.5);
        assert!(n.set_weight(idx, 2.0));
        assert_eq!(n.weight(idx), Some(2.0));
        assert!(n.erase(idx));
        assert!(!n.erase(idx));
        assert!(!n.set_weight(idx, 1.0));
        assert!(n.is_empty());
    }

    #[test]
    fn add_replaces_existing_link() {
        let mut n = Neighborhood::new(CellId(0));
        let idx = CellIndex::new(5, 5);
        n.add_weighted(idx, CellId(1), 1.0);
        let previous = n.add_weighted(idx, CellId(2), 3.0).unwrap();
        assert_eq!(previous.cell, CellId(1));
        assert_eq!(n.len(), 1);
        assert_eq!(n.get(idx).unwrap().cell, CellId(2));
    }

    #[test]
    fn parent_roundtrip() {
        let mut n = Neighborhood::new(CellId(4));
        assert_eq!(n.parent(), CellId(4));
        n.set_parent(CellId(9));
        assert_eq!(n.parent(), CellId(9));
    }

    #[test]
    fn erase_cell_drops_all_links_to_it() {
        let mut n = Neighborhood::new(CellId(0));
        n.add(CellIndex::new(0, 1), CellId(1));
        n.add(CellIndex::new(0, 2), CellId(1));
        n.add(CellIndex::new(0, 3), CellId(2));
        assert_eq!(n.erase_cell(CellId(1)), 2);
        assert_eq!(n.cells().collect::<Vec<_>>(), vec![CellId(2)]);
    }
}

#[cfg(test)]
mod cell {
    use ms_core::{AgentId, CellId, ModeId};

    use crate::{Cell, CellIndex, Neighborhood, SyncScope};

    fn cell() -> Cell {
        Cell::new(CellId(0), CellIndex::new(0, 0))
    }

    #[test]
    fn attach_replaces_existing_entry() {
        let mut c = cell();
        assert_eq!(c.attach_control_mode(AgentId(1), ModeId(0)), None);
        assert_eq!(c.attach_control_mode(AgentId(1), ModeId(2)), Some(ModeId(0)));
        assert_eq!(c.control_mode(AgentId(1)), Some(ModeId(2)));
        // Idempotent.
        c.attach_control_mode(AgentId(1), ModeId(2));
        assert_eq!(c.control_mode(AgentId(1)), Some(ModeId(2)));
        assert_eq!(c.tracked_agents(), vec![AgentId(1)]);
    }

    #[test]
    fn detach_reports_presence() {
        let mut c = cell();
        c.attach_control_mode(AgentId(1), ModeId(0));
        assert!(c.detach_control_mode(AgentId(1)));
        assert!(!c.detach_control_mode(AgentId(1)));
        assert_eq!(c.control_mode(AgentId(1)), None);
    }

    #[test]
    fn mode_change_resets_latency() {
        let mut c = cell();
        c.attach_control_mode(AgentId(0), ModeId(0));
        c.tick_latency();
        c.tick_latency();
        assert_eq!(c.latency(), 2);

        c.attach_control_mode(AgentId(0), ModeId(0));
        assert_eq!(c.latency(), 2, "same mode keeps latency");

        c.attach_control_mode(AgentId(0), ModeId(1));
        assert_eq!(c.latency(), 0);
    }

    #[test]
    fn first_synchronize_allocates_snapshot() {
        let mut c = cell();
        c.set("alive", true);
        assert!(c.past().is_none());
        c.synchronize(SyncScope::All);
        assert_eq!(c.past().unwrap().flag("alive"), Some(true));
    }

    #[test]
    fn past_is_a_value_copy() {
        let mut c = cell();
        c.set("height", 1.0);
        c.synchronize(SyncScope::All);
        c.set("height", 5.0);

        assert_eq!(c.past().unwrap().number("height"), Some(1.0));
        assert_eq!(c.state().number("height"), Some(5.0));

        c.synchronize(SyncScope::All);
        assert_eq!(c.past().unwrap().number("height"), Some(5.0));
    }

    #[test]
    fn selective_synchronize() {
        let mut c = cell();
        c.set("a", 1.0);
        c.set("b", 1.0);
        c.synchronize(SyncScope::All);
        c.set("a", 2.0);
        c.set("b", 2.0);

        c.synchronize(SyncScope::Only(&["a"]));
        let past = c.past().unwrap();
        assert_eq!(past.number("a"), Some(2.0));
        assert_eq!(past.number("b"), Some(1.0));
    }

    #[test]
    fn past_or_current_falls_back() {
        let mut c = cell();
        c.set("x", 3.0);
        assert_eq!(c.past_or_current().number("x"), Some(3.0));
    }

    #[test]
    fn add_neighborhood_sets_parent() {
        let mut c = Cell::new(CellId(6), CellIndex::new(0, 0));
        c.add_neighborhood("moore", Neighborhood::new(CellId::INVALID));
        assert_eq!(c.neighborhood("moore").unwrap().parent(), CellId(6));
        assert_eq!(c.neighborhood_names().collect::<Vec<_>>(), vec!["moore"]);
    }
}

#[cfg(test)]
mod space {
    use ms_core::{AgentId, CellId, ModeId};

    use crate::{CellIndex, CellState, CellularSpace, StructuralChange, SyncScope};

    #[test]
    fn grid_layout() {
        let space = CellularSpace::grid("g", 3, 2).unwrap();
        assert_eq!(space.len(), 6);
        assert_eq!(space.find(CellIndex::new(2, 1)), Some(CellId(5)));
        assert_eq!(space.find(CellIndex::new(3, 0)), None);
    }

    #[test]
    fn zero_dimension_grid_rejected() {
        assert!(CellularSpace::grid("g", 0, 4).is_err());
    }

    #[test]
    fn attach_agent_touches_only_present_cells() {
        let mut space = CellularSpace::grid("g", 2, 2).unwrap();
        assert_eq!(space.attach_agent(AgentId(1), ModeId(0)), 4);

        let late = space.add_cell(CellIndex::new(9, 9));
        assert_eq!(space.cell(late).unwrap().control_mode(AgentId(1)), None);
        for id in [CellId(0), CellId(1), CellId(2), CellId(3)] {
            assert_eq!(space.cell(id).unwrap().control_mode(AgentId(1)), Some(ModeId(0)));
        }
    }

    #[test]
    fn detach_agent_counts_tracking_cells() {
        let mut space = CellularSpace::grid("g", 2, 1).unwrap();
        space.attach_agent(AgentId(3), ModeId(1));
        space.add_cell(CellIndex::new(5, 5));
        assert_eq!(space.detach_agent(AgentId(3)), 2);
        assert_eq!(space.detach_agent(AgentId(3)), 0);
    }

    #[test]
    fn synchronize_broadcasts() {
        let mut space = CellularSpace::grid("g", 2, 2).unwrap();
        for cell in space.cells_mut() {
            cell.set("v", 1.0);
        }
        space.synchronize(SyncScope::All);
        assert!(space.cells().all(|c| c.past().unwrap().number("v") == Some(1.0)));
    }

    #[test]
    fn moore_neighborhood_interior_and_corner() {
        let mut space = CellularSpace::grid("g", 3, 3).unwrap();
        space.create_moore_neighborhood("moore", false, false);

        let center = space.cell_at(CellIndex::new(1, 1)).unwrap();
        let hood = center.neighborhood("moore").unwrap();
        assert_eq!(hood.len(), 8);
        assert_eq!(hood.parent(), center.id());
        assert!((hood.weight(CellIndex::new(0, 0)).unwrap() - 0.125).abs() < 1e-12);

        let corner = space.cell_at(CellIndex::new(0, 0)).unwrap();
        assert_eq!(corner.neighborhood("moore").unwrap().len(), 3);
    }

    #[test]
    fn moore_neighborhood_wraps_on_torus() {
        let mut space = CellularSpace::grid("g", 4, 4).unwrap();
        space.create_moore_neighborhood("moore", false, true);
        let corner = space.cell_at(CellIndex::new(0, 0)).unwrap();
        let hood = corner.neighborhood("moore").unwrap();
        assert_eq!(hood.len(), 8);
        assert!(hood.contains(CellIndex::new(3, 3)));
    }

    #[test]
    fn von_neumann_with_self() {
        let mut space = CellularSpace::grid("g", 3, 3).unwrap();
        space.create_von_neumann_neighborhood("vn", true, false);
        let center = space.cell_at(CellIndex::new(1, 1)).unwrap();
        let hood = center.neighborhood("vn").unwrap();
        assert_eq!(hood.len(), 5);
        assert!(hood.contains(CellIndex::new(1, 1)));
    }

    #[test]
    fn remove_cell_leaves_stale_handle_unresolvable() {
        let mut space = CellularSpace::grid("g", 2, 2).unwrap();
        space.create_moore_neighborhood("moore", false, false);
        let gone = space.find(CellIndex::new(0, 0)).unwrap();

        space.remove_cell(gone).unwrap();
        assert!(space.cell(gone).is_none());
        assert_eq!(space.len(), 3);
        for cell in space.cells() {
            let hood = cell.neighborhood("moore").unwrap();
            assert!(hood.cells().all(|c| c != gone));
        }
        assert!(space.remove_cell(gone).is_err());
    }

    #[test]
    fn deferred_changes_apply_on_update() {
        let mut space = CellularSpace::grid("g", 2, 1).unwrap();
        let a = CellId(0);
        let b = CellId(1);

        space.defer(StructuralChange::Link {
            from: a,
            neighborhood: "road".into(),
            to: b,
            weight: 2.5,
        });
        space.defer(StructuralChange::AddCell {
            index: CellIndex::new(7, 7),
            state: [("fresh", true)].into_iter().collect::<CellState>(),
        });
        assert_eq!(space.pending_changes(), 2);
        assert_eq!(space.len(), 2, "nothing applied before update");

        assert_eq!(space.update().unwrap(), 2);
        assert_eq!(space.len(), 3);
        let road = space.cell(a).unwrap().neighborhood("road").unwrap();
        assert_eq!(road.weight(CellIndex::new(1, 0)), Some(2.5));
        assert_eq!(space.cell_at(CellIndex::new(7, 7)).unwrap().state().flag("fresh"), Some(true));
    }

    #[test]
    fn failed_change_keeps_later_ones_queued() {
        let mut space = CellularSpace::grid("g", 1, 1).unwrap();
        space.defer(StructuralChange::RemoveCell(CellId(42)));
        space.defer(StructuralChange::AddCell {
            index: CellIndex::new(1, 1),
            state: CellState::new(),
        });
        assert!(space.update().is_err());
        assert_eq!(space.pending_changes(), 1);
        assert_eq!(space.update().unwrap(), 1);
        assert_eq!(space.len(), 2);
    }

    #[test]
    fn unlink_missing_neighborhood_errors() {
        let mut space = CellularSpace::grid("g", 1, 1).unwrap();
        space.defer(StructuralChange::Unlink {
            from: CellId(0),
            neighborhood: "none".into(),
            to: CellIndex::new(0, 0),
        });
        assert!(space.update().is_err());
    }

    #[test]
    fn neighborhoods_at_the_edge_of_the_index_range() {
        let mut space = CellularSpace::new("edge");
        let last = space.add_cell(CellIndex::new(i32::MAX, 0));
        space.add_cell(CellIndex::new(i32::MAX - 1, 0));

        assert_eq!(space.create_moore_neighborhood("m", false, false), 2);
        let hood = space.cell(last).unwrap().neighborhood("m").unwrap();
        assert_eq!(hood.len(), 1);
        assert!(hood.contains(CellIndex::new(i32::MAX - 1, 0)));
    }

    #[test]
    fn torus_spanning_the_whole_index_range() {
        let mut space = CellularSpace::new("wide");
        let low = space.add_cell(CellIndex::new(i32::MIN, 0));
        let high = space.add_cell(CellIndex::new(i32::MAX, 0));

        space.create_von_neumann_neighborhood("vn", false, true);
        let s = &space;
        assert!(s.cell(high).unwrap().neighborhood("vn").unwrap().contains(CellIndex::new(i32::MIN, 0)));
        assert!(s.cell(low).unwrap().neighborhood("vn").unwrap().contains(CellIndex::new(i32::MAX, 0)));
    }

    #[test]
    fn nearest_cell_query() {
        let mut space = CellularSpace::grid("g", 3, 3).unwrap();
        assert_eq!(space.nearest(1.9, 0.2), space.find(CellIndex::new(2, 0)));

        let far = space.add_cell(CellIndex::new(100, 100));
        assert_eq!(space.nearest(90.0, 95.0), Some(far));

        space.remove_cell(far).unwrap();
        assert_eq!(space.nearest(90.0, 95.0), space.find(CellIndex::new(2, 2)));
    }

    #[test]
    fn space_attributes() {
        let mut space = CellularSpace::new("s");
        space.attributes_mut().set("rain", 3.5);
        assert_eq!(space.attributes().number("rain"), Some(3.5));
        assert!(space.is_empty());
        assert_eq!(space.name(), "s");
    }
}
