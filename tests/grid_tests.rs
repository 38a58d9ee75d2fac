//! Tests for the grid abstraction, the tetromino model, and the piece
//! provider.
//!
//! Test categories:
//! - Overlay semantics (`can_place` / `place`)
//! - Read-only views
//! - Rotation transforms and wall kicks
//! - 7-bag provider fairness

use blockfall::game::Board;
use blockfall::grid::{Cell, CellGrid, GridView, Pos, Size, StaticGrid};
use blockfall::provider::{BagProvider, PieceProvider, SequenceProvider};
use blockfall::tetromino::{
    rotate_point, tetromino, unrotate_point, Rotation, Tetromino,
};

// ============================================================================
// Overlay Semantics
// ============================================================================

mod overlay {
    use super::*;

    #[test]
    fn empty_grid_accepts_piece_anywhere_in_bounds() {
        let board = Board::new();
        let piece = tetromino(Cell::T);

        assert!(board.can_place(Pos::new(0, 0), &piece));
        assert!(board.can_place(Pos::new(7, 28), &piece));
    }

    #[test]
    fn overflow_past_right_edge_is_rejected() {
        let board = Board::new();
        let piece = tetromino(Cell::T); // 3 wide

        assert!(board.can_place(Pos::new(7, 0), &piece));
        assert!(!board.can_place(Pos::new(8, 0), &piece));
    }

    #[test]
    fn overflow_past_bottom_edge_is_rejected() {
        let board = Board::new();
        let piece = tetromino(Cell::T); // 2 tall

        assert!(board.can_place(Pos::new(0, 28), &piece));
        assert!(!board.can_place(Pos::new(0, 29), &piece));
    }

    #[test]
    fn filled_cell_under_filled_tile_cell_is_rejected() {
        let mut board = Board::new();
        let piece = tetromino(Cell::T); // filled at (1, 0) of its own frame
        board.set(Pos::new(3, 10), Cell::S);

        assert!(!board.can_place(Pos::new(2, 10), &piece));
    }

    #[test]
    fn filled_cell_under_empty_tile_cell_is_accepted() {
        let mut board = Board::new();
        let piece = tetromino(Cell::T); // empty at (0, 0) of its own frame
        board.set(Pos::new(2, 10), Cell::S);

        assert!(board.can_place(Pos::new(2, 10), &piece));
    }

    #[test]
    fn place_copies_only_filled_tile_cells() {
        let mut board = Board::new();
        let piece = tetromino(Cell::T);
        // Under the T's empty top-left corner.
        board.set(Pos::new(2, 10), Cell::S);

        board.place(Pos::new(2, 10), &piece);

        assert_eq!(board.get(Pos::new(2, 10)), Cell::S);
        assert_eq!(board.get(Pos::new(3, 10)), Cell::T);
        assert_eq!(board.get(Pos::new(2, 11)), Cell::T);
        assert_eq!(board.get(Pos::new(3, 11)), Cell::T);
        assert_eq!(board.get(Pos::new(4, 11)), Cell::T);
    }

    #[test]
    fn collapse_row_shifts_rows_above_down() {
        let mut grid: StaticGrid<2, 4> = StaticGrid::new();
        grid.set(Pos::new(0, 0), Cell::I);
        grid.set(Pos::new(0, 1), Cell::J);
        grid.set(Pos::new(0, 2), Cell::L);
        grid.set(Pos::new(0, 3), Cell::O);

        grid.collapse_row(2);

        assert_eq!(grid.get(Pos::new(0, 0)), Cell::Empty);
        assert_eq!(grid.get(Pos::new(0, 1)), Cell::I);
        assert_eq!(grid.get(Pos::new(0, 2)), Cell::J);
        assert_eq!(grid.get(Pos::new(0, 3)), Cell::O);
    }

    #[test]
    #[should_panic]
    fn out_of_bounds_get_is_fatal() {
        let grid: StaticGrid<4, 4> = StaticGrid::new();
        grid.get(Pos::new(4, 0));
    }

    #[test]
    #[should_panic(expected = "shape literal")]
    fn oversized_shape_literal_is_fatal() {
        let row = [Cell::I; 5];
        StaticGrid::<4, 4>::from_rows(&[&row]);
    }
}

// ============================================================================
// Read-Only Views
// ============================================================================

mod views {
    use super::*;

    #[test]
    fn view_translates_reads() {
        let mut board = Board::new();
        board.set(Pos::new(2, 12), Cell::Z);

        let view = GridView::new(&board, Pos::new(0, 10), Pos::new(10, 30));

        assert_eq!(view.size(), Size::new(10, 20));
        assert_eq!(view.get(Pos::new(2, 2)), Cell::Z);
        assert_eq!(view.get(Pos::new(0, 0)), Cell::Empty);
    }

    #[test]
    #[should_panic(expected = "GridView")]
    fn mutating_through_view_is_fatal() {
        let board = Board::new();
        let mut view = GridView::new(&board, Pos::new(0, 0), Pos::new(10, 30));
        view.set(Pos::new(0, 0), Cell::I);
    }
}

// ============================================================================
// Rotation Transforms
// ============================================================================

mod rotation_transforms {
    use super::*;

    #[test]
    fn unrotate_inverts_rotate_for_every_state() {
        let size = Size::new(3, 2);
        for rot in [Rotation::R0, Rotation::R90, Rotation::R180, Rotation::R270] {
            for y in 0..size.height {
                for x in 0..size.width {
                    let p = Pos::new(x, y);
                    assert_eq!(unrotate_point(rot, rotate_point(rot, p, size), size), p);
                }
            }
        }
    }

    #[test]
    fn rotation_state_cycle_has_order_four() {
        let mut rot = Rotation::R0;
        for _ in 0..4 {
            rot = rot.ccw();
        }
        assert_eq!(rot, Rotation::R0);

        for _ in 0..4 {
            rot = rot.cw();
        }
        assert_eq!(rot, Rotation::R0);
    }

    #[test]
    fn rotated_piece_swaps_reported_size() {
        let board = Board::new();
        let mut piece = tetromino(Cell::I);
        let mut pos = Pos::new(3, 9);

        assert_eq!(piece.size(), Size::new(4, 1));
        piece.rotate_ccw(&board, &mut pos);
        assert_eq!(piece.size(), Size::new(1, 4));
    }

    #[test]
    fn rotated_piece_reads_transformed_cells() {
        let board = Board::new();
        let mut piece = tetromino(Cell::I);
        let mut pos = Pos::new(3, 9);
        piece.rotate_ccw(&board, &mut pos);

        // Vertical I: one column of four cells.
        for y in 0..4 {
            assert_eq!(piece.get(Pos::new(0, y)), Cell::I);
        }
    }

    #[test]
    fn canonical_storage_is_never_copied_by_rotation() {
        let board = Board::new();
        let mut piece = tetromino(Cell::L);
        let reference = tetromino(Cell::L);
        let mut pos = Pos::new(3, 9);

        for _ in 0..4 {
            piece.rotate_ccw(&board, &mut pos);
        }

        // Back at the unrotated state, reads match the untouched reference.
        for y in 0..2 {
            for x in 0..3 {
                let p = Pos::new(x, y);
                assert_eq!(piece.get(p), reference.get(p));
            }
        }
    }
}

// ============================================================================
// Rotation Protocol & Wall Kicks
// ============================================================================

mod rotation_protocol {
    use super::*;

    #[test]
    fn square_ignores_rotation_requests() {
        let board = Board::new();
        let mut piece = tetromino(Cell::O);
        let mut pos = Pos::new(3, 9);

        assert!(!piece.rotates());
        for _ in 0..4 {
            piece.rotate_ccw(&board, &mut pos);
        }

        assert_eq!(pos, Pos::new(3, 9));
        assert_eq!(piece.rotation(), Rotation::R0);
    }

    #[test]
    fn four_rotations_return_to_origin() {
        let board = Board::new();
        for kind in [Cell::I, Cell::J, Cell::L, Cell::S, Cell::Z, Cell::T] {
            let mut piece = tetromino(kind);
            let mut pos = Pos::new(4, 15);

            for _ in 0..4 {
                piece.rotate_ccw(&board, &mut pos);
            }

            assert_eq!(pos, Pos::new(4, 15), "{kind:?} drifted");
            assert_eq!(piece.rotation(), Rotation::R0, "{kind:?} did not cycle");
        }
    }

    #[test]
    fn pivot_stays_fixed_across_one_rotation() {
        // T pivot is (1, 1); at position (3, 9) the pivot sits at (4, 10) and
        // must still be there after rotating.
        let board = Board::new();
        let mut piece = tetromino(Cell::T);
        let mut pos = Pos::new(3, 9);

        piece.rotate_ccw(&board, &mut pos);

        let pivot_now = rotate_point(piece.rotation(), Pos::new(1, 1), Size::new(3, 2));
        assert_eq!(pos.x + pivot_now.x, 4);
        assert_eq!(pos.y + pivot_now.y, 10);
    }

    #[test]
    fn wall_kick_shifts_piece_off_the_left_wall() {
        let board = Board::new();
        let mut piece = tetromino(Cell::I);
        let mut pos = Pos::new(3, 9);

        // Spin to 270° and park against the left wall.
        piece.rotate_ccw(&board, &mut pos);
        piece.rotate_ccw(&board, &mut pos);
        piece.rotate_ccw(&board, &mut pos);
        assert_eq!(piece.rotation(), Rotation::R270);
        pos.x = 0;
        let y_before = pos.y;

        // Returning to horizontal wants x = -1; the +1 kick rescues it.
        piece.rotate_ccw(&board, &mut pos);

        assert_eq!(piece.rotation(), Rotation::R0);
        assert_eq!(pos, Pos::new(0, y_before + 1));
    }

    #[test]
    fn rotation_with_no_valid_candidate_is_a_noop() {
        let board = Board::new();
        let mut piece = tetromino(Cell::I);
        let mut pos = Pos::new(3, 9);

        // Vertical I on the left wall: rotating to 180° needs x = -2, and
        // neither kick reaches a non-negative column.
        piece.rotate_ccw(&board, &mut pos);
        assert_eq!(piece.rotation(), Rotation::R90);
        pos.x = 0;
        let pos_before = pos;

        piece.rotate_ccw(&board, &mut pos);

        assert_eq!(piece.rotation(), Rotation::R90);
        assert_eq!(pos, pos_before);
    }

    #[test]
    fn blocked_rotation_leaves_state_unchanged() {
        let mut board = Board::new();
        // Box the T in so every rotation candidate collides.
        for x in 0..10 {
            for y in 11..14 {
                board.set(Pos::new(x, y), Cell::S);
            }
        }
        board.set(Pos::new(3, 11), Cell::Empty);
        board.set(Pos::new(4, 11), Cell::Empty);
        board.set(Pos::new(5, 11), Cell::Empty);

        let mut piece = tetromino(Cell::T);
        let mut pos = Pos::new(3, 10);
        assert!(board.can_place(pos, &piece));

        piece.rotate_ccw(&board, &mut pos);

        assert_eq!(piece.rotation(), Rotation::R0);
        assert_eq!(pos, Pos::new(3, 10));
    }
}

// ============================================================================
// Shape Table
// ============================================================================

mod shapes {
    use super::*;

    #[test]
    fn every_shape_has_four_cells_of_its_own_kind() {
        for kind in [
            Cell::I,
            Cell::J,
            Cell::L,
            Cell::O,
            Cell::S,
            Cell::Z,
            Cell::T,
        ] {
            let piece = tetromino(kind);
            let size = piece.size();
            let mut filled = 0;
            for y in 0..size.height {
                for x in 0..size.width {
                    let cell = piece.get(Pos::new(x, y));
                    if !cell.is_empty() {
                        assert_eq!(cell, kind);
                        filled += 1;
                    }
                }
            }
            assert_eq!(filled, 4, "{kind:?} is not a tetromino");
            assert_eq!(piece.kind(), kind);
        }
    }

    #[test]
    fn only_the_square_refuses_to_rotate() {
        for kind in [
            Cell::I,
            Cell::J,
            Cell::L,
            Cell::O,
            Cell::S,
            Cell::Z,
            Cell::T,
        ] {
            assert_eq!(tetromino(kind).rotates(), kind != Cell::O);
        }
    }

    #[test]
    #[should_panic(expected = "no shape")]
    fn empty_cell_has_no_shape() {
        tetromino(Cell::Empty);
    }

    #[test]
    fn custom_shape_without_pivot_does_not_rotate() {
        let piece = Tetromino::new(&[&[Cell::I, Cell::I]]);
        assert!(!piece.rotates());
    }
}

// ============================================================================
// Piece Provider
// ============================================================================

mod piece_provider {
    use super::*;
    use std::collections::HashSet;

    const ALL_KINDS: [Cell; 7] = [
        Cell::I,
        Cell::J,
        Cell::L,
        Cell::O,
        Cell::S,
        Cell::Z,
        Cell::T,
    ];

    #[test]
    fn each_aligned_bag_window_holds_every_shape_once() {
        let mut provider = BagProvider::seeded(42);

        for bag in 0..10 {
            let kinds: HashSet<Cell> = (0..7).map(|_| provider.next().kind()).collect();
            assert_eq!(kinds.len(), 7, "bag {bag} repeated a shape");
            for kind in ALL_KINDS {
                assert!(kinds.contains(&kind), "bag {bag} is missing {kind:?}");
            }
        }
    }

    #[test]
    fn no_shape_repeats_more_than_twice_in_a_row() {
        let mut provider = BagProvider::seeded(7);
        let draws: Vec<Cell> = (0..700).map(|_| provider.next().kind()).collect();

        for window in draws.windows(3) {
            assert!(
                !(window[0] == window[1] && window[1] == window[2]),
                "shape {:?} appeared three times in a row",
                window[0]
            );
        }
    }

    #[test]
    fn different_seeds_produce_different_orderings() {
        let mut a = BagProvider::seeded(1);
        let mut b = BagProvider::seeded(2);

        let first: Vec<Cell> = (0..14).map(|_| a.next().kind()).collect();
        let second: Vec<Cell> = (0..14).map(|_| b.next().kind()).collect();

        assert_ne!(first, second);
    }

    #[test]
    fn reset_returns_the_provider_to_a_bag_boundary() {
        let mut provider = BagProvider::seeded(42);
        // Leave the bag partially drawn.
        for _ in 0..3 {
            provider.next();
        }

        provider.reset();

        let kinds: HashSet<Cell> = (0..7).map(|_| provider.next().kind()).collect();
        assert_eq!(kinds.len(), 7, "draws after reset are not a fresh bag");
    }

    #[test]
    fn sequence_provider_cycles() {
        let mut provider = SequenceProvider::new(vec![Cell::I, Cell::O]);

        assert_eq!(provider.next().kind(), Cell::I);
        assert_eq!(provider.next().kind(), Cell::O);
        assert_eq!(provider.next().kind(), Cell::I);
    }

    #[test]
    fn sequence_provider_reset_restarts_the_sequence() {
        let mut provider = SequenceProvider::new(vec![Cell::I, Cell::O, Cell::T]);
        provider.next();
        provider.next();

        provider.reset();

        assert_eq!(provider.next().kind(), Cell::I);
    }
}
