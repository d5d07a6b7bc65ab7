//! River growth.
//!
//! Rivers are grown opportunistically, at most one step per explorer move, over
//! tiles that already exist. Each river is stored tip-first: index 0 is the
//! newest node and the last index is its source.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::generation::TileLookup;
use crate::hex::Hex;
use crate::key_rng::RandomStream;
use crate::terrain::TerrainType;

/// Chance that a move does anything to the rivers at all.
pub const ATTEMPT_CHANCE: f64 = 0.5;
/// Chance of extending an existing river rather than starting a new one.
pub const EXTEND_CHANCE: f64 = 0.6;
/// Rings searched around the explorer for a new source.
pub const SOURCE_SEARCH_RADIUS: u32 = 4;
const MONT_SOURCE_BELOW: f64 = 0.4;
const MONT_NOIR_SOURCE_BELOW: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct River {
    nodes: VecDeque<Hex>,
    finished: bool,
}

impl River {
    pub fn new(source: Hex) -> Self {
        River {
            nodes: VecDeque::from([source]),
            finished: false,
        }
    }

    pub fn tip(&self) -> Hex {
        self.nodes[0]
    }

    pub fn source(&self) -> Hex {
        self.nodes[self.nodes.len() - 1]
    }

    pub fn nodes(&self) -> &VecDeque<Hex> {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn contains(&self, hex: Hex) -> bool {
        self.nodes.contains(&hex)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiverEvent {
    /// The move left the rivers alone.
    Idle,
    Extended { river: usize, to: Hex, finished: bool },
    /// The tip had nowhere to go; the river was closed where it stands.
    DriedUp { river: usize },
    Started { river: usize, source: Hex },
    /// A new river was wanted but the drawn source bucket was empty.
    NoSource,
}

/// All rivers of a session. Rivers never share a cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiverNetwork {
    rivers: Vec<River>,
}

impl RiverNetwork {
    pub fn new() -> Self {
        RiverNetwork::default()
    }

    pub fn rivers(&self) -> &[River] {
        &self.rivers
    }

    pub fn len(&self) -> usize {
        self.rivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rivers.is_empty()
    }

    pub fn finished_count(&self) -> usize {
        self.rivers.iter().filter(|r| r.finished).count()
    }

    pub fn occupies(&self, hex: Hex) -> bool {
        self.rivers.iter().any(|river| river.contains(hex))
    }

    pub fn clear(&mut self) {
        self.rivers.clear();
    }

    /// One per-move growth attempt around the explorer at `position`.
    pub fn grow(
        &mut self,
        world: &impl TileLookup,
        position: Hex,
        stream: &mut RandomStream,
    ) -> RiverEvent {
        if stream.next_unit() >= ATTEMPT_CHANCE {
            return RiverEvent::Idle;
        }

        let open: Vec<usize> = self
            .rivers
            .iter()
            .enumerate()
            .filter(|(_, river)| !river.finished)
            .map(|(index, _)| index)
            .collect();
        if stream.next_unit() < EXTEND_CHANCE {
            if let Some(&index) = stream.pick(&open) {
                return self.extend(index, world, stream);
            }
        }
        self.start(world, position, stream)
    }

    pub(crate) fn extend(
        &mut self,
        index: usize,
        world: &impl TileLookup,
        stream: &mut RandomStream,
    ) -> RiverEvent {
        let tip = self.rivers[index].tip();
        let options: Vec<(Hex, TerrainType)> = tip
            .neighbors()
            .into_iter()
            .filter(|hex| !self.occupies(*hex))
            .filter_map(|hex| world.terrain_at(hex).map(|t| (hex, t)))
            .filter(|(_, t)| t.is_river_passable() || t.is_river_terminal())
            .collect();

        let river = &mut self.rivers[index];
        let Some(&(next, terrain)) = stream.pick(&options) else {
            river.finished = true;
            tracing::info!(
                target: "hexmapper::river",
                river = index,
                length = river.len(),
                "river.dried_up"
            );
            return RiverEvent::DriedUp { river: index };
        };

        river.nodes.push_front(next);
        river.finished = terrain.is_river_terminal();
        tracing::debug!(
            target: "hexmapper::river",
            river = index,
            q = next.q,
            r = next.r,
            terrain = terrain.key(),
            finished = river.finished,
            "river.extended"
        );
        RiverEvent::Extended {
            river: index,
            to: next,
            finished: river.finished,
        }
    }

    pub(crate) fn start(
        &mut self,
        world: &impl TileLookup,
        position: Hex,
        stream: &mut RandomStream,
    ) -> RiverEvent {
        let mut mont = Vec::new();
        let mut mont_noir = Vec::new();
        let mut passable = Vec::new();
        for cell in position.disk(SOURCE_SEARCH_RADIUS) {
            if self.occupies(cell) {
                continue;
            }
            match world.terrain_at(cell) {
                Some(TerrainType::Mont) => mont.push(cell),
                Some(TerrainType::MontNoir) => mont_noir.push(cell),
                Some(t) if t.is_river_passable() => passable.push(cell),
                _ => {}
            }
        }

        let roll = stream.next_unit();
        let bucket = if roll < MONT_SOURCE_BELOW {
            &mont
        } else if roll < MONT_NOIR_SOURCE_BELOW {
            &mont_noir
        } else {
            &passable
        };
        let Some(&source) = stream.pick(bucket) else {
            return RiverEvent::NoSource;
        };

        self.rivers.push(River::new(source));
        let index = self.rivers.len() - 1;
        tracing::info!(
            target: "hexmapper::river",
            river = index,
            q = source.q,
            r = source.r,
            "river.started"
        );
        RiverEvent::Started {
            river: index,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key_rng::{river_stream, stream_for};
    use std::collections::{HashMap, HashSet};

    fn stream(n: u64) -> RandomStream {
        river_stream("rivers", n, Hex::ORIGIN)
    }

    #[test]
    fn test_new_river_is_single_open_node() {
        let river = River::new(Hex::new(2, -1));
        assert_eq!(river.len(), 1);
        assert_eq!(river.tip(), river.source());
        assert!(!river.is_finished());
    }

    #[test]
    fn test_extend_prepends_and_finishes_at_shadow_sea() {
        let world: HashMap<Hex, TerrainType> = [
            (Hex::new(0, 0), TerrainType::Mont),
            (Hex::new(1, 0), TerrainType::Riviere),
            (Hex::new(2, 0), TerrainType::MerDOmbre),
        ]
        .into();
        let mut network = RiverNetwork::new();
        network.rivers.push(River::new(Hex::new(0, 0)));

        let mut s = stream(1);
        assert_eq!(
            network.extend(0, &world, &mut s),
            RiverEvent::Extended {
                river: 0,
                to: Hex::new(1, 0),
                finished: false
            }
        );
        assert_eq!(
            network.extend(0, &world, &mut s),
            RiverEvent::Extended {
                river: 0,
                to: Hex::new(2, 0),
                finished: true
            }
        );
        let river = &network.rivers()[0];
        assert_eq!(
            river.nodes().iter().copied().collect::<Vec<_>>(),
            vec![Hex::new(2, 0), Hex::new(1, 0), Hex::new(0, 0)]
        );
        assert!(river.is_finished());
        assert_eq!(river.source(), Hex::new(0, 0));
    }

    #[test]
    fn test_extend_without_outlet_dries_up() {
        let world: HashMap<Hex, TerrainType> = [
            (Hex::new(0, 0), TerrainType::MontNoir),
            (Hex::new(1, 0), TerrainType::Saliniere),
            (Hex::new(0, 1), TerrainType::Foret),
        ]
        .into();
        let mut network = RiverNetwork::new();
        network.rivers.push(River::new(Hex::ORIGIN));
        assert_eq!(
            network.extend(0, &world, &mut stream(2)),
            RiverEvent::DriedUp { river: 0 }
        );
        assert_eq!(network.rivers()[0].len(), 1);
        assert!(network.rivers()[0].is_finished());
    }

    #[test]
    fn test_start_draws_from_type_buckets() {
        let mut world = HashMap::new();
        world.insert(Hex::new(1, 0), TerrainType::Mont);
        world.insert(Hex::new(-1, 0), TerrainType::MontNoir);
        world.insert(Hex::new(0, 3), TerrainType::CanyonPlat);
        world.insert(Hex::new(0, 5), TerrainType::Lac);
        world.insert(Hex::new(0, -2), TerrainType::Jungle);

        let mut seen = HashSet::new();
        for n in 0..200 {
            let mut network = RiverNetwork::new();
            match network.start(&world, Hex::ORIGIN, &mut stream(n)) {
                RiverEvent::Started { source, .. } => {
                    seen.insert(source);
                }
                other => panic!("unexpected {:?}", other),
            }
        }
        let expected: HashSet<Hex> = [Hex::new(1, 0), Hex::new(-1, 0), Hex::new(0, 3)].into();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_start_with_empty_bucket_does_nothing() {
        let world: HashMap<Hex, TerrainType> = [(Hex::new(1, 1), TerrainType::Lac)].into();
        let mut started = 0;
        let mut skipped = 0;
        for n in 0..200 {
            let mut network = RiverNetwork::new();
            match network.start(&world, Hex::ORIGIN, &mut stream(n)) {
                RiverEvent::Started { source, .. } => {
                    assert_eq!(source, Hex::new(1, 1));
                    started += 1;
                }
                RiverEvent::NoSource => {
                    assert!(network.is_empty());
                    skipped += 1;
                }
                other => panic!("unexpected {:?}", other),
            }
        }
        assert!(started > 0 && skipped > started);
    }

    #[test]
    fn test_finished_rivers_never_change_and_never_merge() {
        // A wide field of channels with shadow seas scattered through it.
        let mut world = HashMap::new();
        for cell in Hex::ORIGIN.disk(8) {
            let roll = stream_for("field", 0, 0, cell.q, cell.r).next_unit();
            let terrain = if roll < 0.1 {
                TerrainType::MerDOmbre
            } else if roll < 0.25 {
                TerrainType::Mont
            } else if roll < 0.4 {
                TerrainType::MontNoir
            } else {
                TerrainType::Riviere
            };
            world.insert(cell, terrain);
        }

        let mut network = RiverNetwork::new();
        let mut closed: HashMap<usize, River> = HashMap::new();
        let mut events = HashSet::new();
        for move_id in 1..400u64 {
            let position = Hex::new((move_id % 5) as i32 - 2, (move_id % 3) as i32 - 1);
            let event = network.grow(&world, position, &mut river_stream("field", move_id, position));
            events.insert(std::mem::discriminant(&event));

            for (index, river) in closed.iter() {
                assert_eq!(&network.rivers()[*index], river);
            }
            for (index, river) in network.rivers().iter().enumerate() {
                if river.is_finished() {
                    closed.entry(index).or_insert_with(|| river.clone());
                }
            }

            let mut cells = HashSet::new();
            for river in network.rivers() {
                for node in river.nodes() {
                    assert!(cells.insert(*node), "rivers share {}", node);
                }
            }
        }
        assert!(!network.is_empty());
        assert!(events.contains(&std::mem::discriminant(&RiverEvent::Idle)));
        assert!(network.finished_count() > 0);
    }
}
