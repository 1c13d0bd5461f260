//! Built-in reference scenarios for the CLI and the test suites.
use crate::scenario::ScenarioParams;

/// Names accepted by [`preset`], in registry order.
pub const PRESET_NAMES: [&str; 2] = ["oasis-crossing", "dune-sprint"];

/// Look up a built-in scenario by its registry name.
#[must_use]
pub fn preset(name: &str) -> Option<ScenarioParams> {
    match name {
        "oasis-crossing" => Some(oasis_crossing()),
        "dune-sprint" => Some(dune_sprint()),
        _ => None,
    }
}

/// All registered preset names.
#[must_use]
pub const fn preset_names() -> &'static [&'static str] {
    &PRESET_NAMES
}

fn adjacency_from_edges(region_count: usize, edges: &[(usize, usize)]) -> Vec<Vec<bool>> {
    let mut matrix = vec![vec![false; region_count]; region_count];
    for (region, row) in matrix.iter_mut().enumerate() {
        row[region] = true;
    }
    for &(a, b) in edges {
        matrix[a][b] = true;
        matrix[b][a] = true;
    }
    matrix
}

/// Ten-day crossing over a nine-region map: villages at the trailhead and the
/// midpoint oasis, a mine spur off the early route, a sandstorm layover on
/// day five, and the terminus in the far corner.
#[must_use]
pub fn oasis_crossing() -> ScenarioParams {
    let edges = [
        (0, 1),
        (0, 2),
        (1, 3),
        (2, 3),
        (2, 6),
        (3, 4),
        (4, 5),
        (4, 8),
        (5, 7),
        (6, 7),
        (7, 8),
    ];
    ScenarioParams {
        day_count: 10,
        region_count: 9,
        daily_purchase_limit: 10,
        mining_yield: 80.0,
        carry_weight_limit: 120.0,
        starting_cash: 600.0,
        water_unit_weight: 3.0,
        food_unit_weight: 2.0,
        water_unit_price: 5.0,
        food_unit_price: 10.0,
        base_water_use: vec![3, 4, 5, 5, 4, 3, 3, 4, 5, 3],
        base_food_use: vec![2, 2, 3, 3, 2, 2, 2, 3, 3, 2],
        mandatory_stay: vec![
            false, false, false, false, true, false, false, false, false, false,
        ],
        village_region: vec![true, false, false, false, true, false, false, false, false],
        mine_region: vec![false, false, true, false, false, false, false, false, false],
        end_region: vec![false, false, false, false, false, false, false, false, true],
        adjacency: adjacency_from_edges(9, &edges),
        start_region: 0,
    }
}

/// Six-day sprint along a five-region line with a mine one hop from the
/// trailhead; small enough to solve exhaustively in tests.
#[must_use]
pub fn dune_sprint() -> ScenarioParams {
    let edges = [(0, 1), (1, 2), (2, 3), (3, 4)];
    ScenarioParams {
        day_count: 6,
        region_count: 5,
        daily_purchase_limit: 6,
        mining_yield: 60.0,
        carry_weight_limit: 90.0,
        starting_cash: 400.0,
        water_unit_weight: 3.0,
        food_unit_weight: 2.0,
        water_unit_price: 5.0,
        food_unit_price: 10.0,
        base_water_use: vec![2, 2, 3, 3, 2, 2],
        base_food_use: vec![1, 2, 2, 2, 1, 1],
        mandatory_stay: vec![false; 6],
        village_region: vec![true, false, true, false, false],
        mine_region: vec![false, true, false, false, false],
        end_region: vec![false, false, false, false, true],
        adjacency: adjacency_from_edges(5, &edges),
        start_region: 0,
    }
}
