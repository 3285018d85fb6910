//! Reachability, pathfinding and attack targeting over the live board.

use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, BinaryHeap, HashMap, HashSet};

use hexfront_protocol::{Hex, Team, UnitClass, UnitId};

use crate::board::Board;
use crate::rules::CompiledRules;
use crate::state::GameState;

/// Cost for `class` to enter `hex`. `None` when off-board or impassable.
pub fn entry_cost(board: &Board, rules: &CompiledRules, hex: Hex, class: UnitClass) -> Option<i32> {
    let terrain = board.terrain(hex)?;
    rules.move_cost(terrain, class)
}

/// Board hexes adjacent to at least one unit not on `team`.
pub fn enemy_zoc(state: &GameState, team: Team) -> HashSet<Hex> {
    let mut zoc = HashSet::new();
    for unit in state.units.values() {
        if unit.team == team {
            continue;
        }
        for neighbor in unit.position.neighbors() {
            if state.board.contains(neighbor) {
                zoc.insert(neighbor);
            }
        }
    }
    zoc
}

fn occupied_hexes(state: &GameState) -> HashSet<Hex> {
    state.units.values().map(|u| u.position).collect()
}

/// Every hex the unit can end a move on, with the cheapest cost to get there.
///
/// Entering a tile in enemy zone of control costs the configured surcharge and ends expansion
/// from that tile. The unit's own tile is never included.
pub fn reachable_costs(
    state: &GameState,
    rules: &CompiledRules,
    unit_id: UnitId,
) -> BTreeMap<Hex, i32> {
    let Some(unit) = state.units.get(&unit_id) else {
        return BTreeMap::new();
    };
    if unit.moved {
        return BTreeMap::new();
    }
    let budget = unit.move_budget();
    if budget <= 0 {
        return BTreeMap::new();
    }

    let start = unit.position;
    let class = unit.class;
    let occupied = occupied_hexes(state);
    let zoc = enemy_zoc(state, unit.team);
    let surcharge = rules.tuning.zoc_surcharge;

    let mut dist: HashMap<Hex, i32> = HashMap::new();
    dist.insert(start, 0);

    let mut heap: BinaryHeap<Reverse<(i32, Hex)>> = BinaryHeap::new();
    heap.push(Reverse((0, start)));

    while let Some(Reverse((cost, hex))) = heap.pop() {
        if dist.get(&hex) != Some(&cost) {
            continue;
        }

        if hex != start && zoc.contains(&hex) {
            continue;
        }

        for neighbor in hex.neighbors() {
            if occupied.contains(&neighbor) {
                continue;
            }
            let Some(step_cost) = entry_cost(&state.board, rules, neighbor, class) else {
                continue;
            };
            let mut new_cost = cost.saturating_add(step_cost);
            if zoc.contains(&neighbor) {
                new_cost = new_cost.saturating_add(surcharge);
            }
            if new_cost > budget {
                continue;
            }
            if new_cost < dist.get(&neighbor).copied().unwrap_or(i32::MAX) {
                dist.insert(neighbor, new_cost);
                heap.push(Reverse((new_cost, neighbor)));
            }
        }
    }

    dist.remove(&start);
    dist.into_iter().collect()
}

/// Destinations for the unit this turn, in row-major order.
pub fn reachable(state: &GameState, rules: &CompiledRules, unit_id: UnitId) -> Vec<Hex> {
    reachable_costs(state, rules, unit_id).into_keys().collect()
}

#[derive(Debug)]
struct OpenNode {
    f: i32,
    g: i32,
    hex: Hex,
    tie: u64,
}

impl OpenNode {
    fn key(&self) -> (i32, i32, Hex, u64) {
        (self.f, self.g, self.hex, self.tie)
    }
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap pops the smallest key.
        other.key().cmp(&self.key())
    }
}

/// Cheapest terrain path from the unit's tile to `goal`, origin and goal included.
///
/// Occupied tiles block; zone of control is not priced here.
pub fn find_path(
    state: &GameState,
    rules: &CompiledRules,
    unit_id: UnitId,
    goal: Hex,
) -> Option<Vec<Hex>> {
    let unit = state.units.get(&unit_id)?;
    let start = unit.position;
    if start == goal {
        return Some(vec![start]);
    }
    let class = unit.class;
    let occupied = occupied_hexes(state);
    if occupied.contains(&goal) {
        return None;
    }
    entry_cost(&state.board, rules, goal, class)?;

    let mut open = BinaryHeap::<OpenNode>::new();
    let mut tie: u64 = 0;
    let mut g_score: HashMap<Hex, i32> = HashMap::new();
    let mut came_from: HashMap<Hex, Hex> = HashMap::new();

    g_score.insert(start, 0);
    open.push(OpenNode {
        f: start.distance(goal),
        g: 0,
        hex: start,
        tie,
    });
    tie += 1;

    while let Some(node) = open.pop() {
        if node.hex == goal {
            let mut path = vec![goal];
            let mut current = goal;
            while let Some(&prev) = came_from.get(&current) {
                path.push(prev);
                current = prev;
            }
            path.reverse();
            return Some(path);
        }

        if g_score.get(&node.hex) != Some(&node.g) {
            continue;
        }

        for neighbor in node.hex.neighbors() {
            if occupied.contains(&neighbor) {
                continue;
            }
            let Some(step_cost) = entry_cost(&state.board, rules, neighbor, class) else {
                continue;
            };
            let tentative_g = node.g.saturating_add(step_cost);
            if tentative_g >= g_score.get(&neighbor).copied().unwrap_or(i32::MAX) {
                continue;
            }
            g_score.insert(neighbor, tentative_g);
            came_from.insert(neighbor, node.hex);
            open.push(OpenNode {
                f: tentative_g.saturating_add(neighbor.distance(goal)),
                g: tentative_g,
                hex: neighbor,
                tie,
            });
            tie += 1;
        }
    }

    None
}

/// Sum of entry costs along `path`, skipping the origin. `None` if any step is impassable.
pub fn path_cost(
    board: &Board,
    rules: &CompiledRules,
    class: UnitClass,
    path: &[Hex],
) -> Option<i32> {
    path.iter().skip(1).try_fold(0i32, |total, &hex| {
        entry_cost(board, rules, hex, class).map(|cost| total + cost)
    })
}

/// Hexes holding enemy units within the unit's attack band. Empty once the unit has attacked.
pub fn attackable(state: &GameState, unit_id: UnitId) -> Vec<Hex> {
    let Some(unit) = state.units.get(&unit_id) else {
        return Vec::new();
    };
    if unit.attacked {
        return Vec::new();
    }

    let enemies: HashSet<Hex> = state
        .units
        .values()
        .filter(|u| u.team != unit.team)
        .map(|u| u.position)
        .collect();
    if enemies.is_empty() {
        return Vec::new();
    }

    let range = unit.attack_range;
    let mut out: Vec<Hex> = unit
        .position
        .ring_inclusive(range.max)
        .filter(|&hex| range.contains(unit.position.distance(hex)))
        .filter(|hex| enemies.contains(hex))
        .collect();
    out.sort();
    out
}
