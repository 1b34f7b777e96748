use powerpac::map::builder::Map;
use powerpac::map::direction::Direction;
use powerpac::map::layout::Maze;
use speculoos::prelude::*;

mod common;

fn assert_links_symmetric(map: &Map) {
    for (id, _) in map.graph.nodes() {
        for direction in Direction::DIRECTIONS {
            if let Some(neighbor) = map.graph.neighbor(id, direction) {
                assert_that(&map.graph.neighbor(neighbor, direction.opposite())).is_equal_to(Some(id));
            }
        }
    }
}

#[test]
fn test_shipped_mazes_have_symmetric_links() {
    for maze in Maze::ALL {
        let map = Map::load(maze, None).unwrap();
        assert_that(&map.graph.len()).is_greater_than(50);
        assert_links_symmetric(&map);
    }
}

#[test]
fn test_square_of_nodes() {
    let graph = common::graph_from("+.+\n+.+");
    assert_that(&graph.len()).is_equal_to(4);

    let top_left = graph.first_node().unwrap();
    let top_right = graph.neighbor(top_left, Direction::Right).unwrap();
    let bottom_left = graph.neighbor(top_left, Direction::Down).unwrap();
    let bottom_right = graph.neighbor(top_right, Direction::Down).unwrap();

    assert_that(&graph.neighbor(bottom_left, Direction::Right)).is_equal_to(Some(bottom_right));
    assert_that(&graph.neighbor(bottom_right, Direction::Up)).is_equal_to(Some(top_right));
    assert_that(&graph.neighbor(top_right, Direction::Left)).is_equal_to(Some(top_left));
    assert_that(&graph.neighbor(top_left, Direction::Up)).is_none();
    assert_that(&graph.distance(top_left, top_right)).is_equal_to(Some(32.0));
}

#[test]
fn test_home_is_wired_to_its_connectors() {
    let map = common::maze1();
    let left = common::node_at(&map, 12.0, 14.0);
    let right = common::node_at(&map, 15.0, 14.0);

    assert_that(&map.graph.neighbor(map.home, Direction::Left)).is_equal_to(Some(left));
    assert_that(&map.graph.neighbor(map.home, Direction::Right)).is_equal_to(Some(right));
    assert_that(&map.graph.neighbor(left, Direction::Right)).is_equal_to(Some(map.home));
    assert_that(&map.graph.is_home_node(map.start_positions.spawn)).is_true();
}

#[test]
fn test_portals_pair_up() {
    let map = common::maze1();
    let west = common::node_at(&map, 0.0, 17.0);
    let east = common::node_at(&map, 27.0, 17.0);
    assert_that(&map.graph.portal(west)).is_equal_to(Some(east));
    assert_that(&map.graph.portal(east)).is_equal_to(Some(west));
}
