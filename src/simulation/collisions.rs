//! Contact detection and perfect-merger resolution.
//!
//! Two bodies collide when their separation drops below the sum of their
//! radii at any point of a step. Motion within a step is taken as linear
//! between the start and end positions, so fast pairs that pass through
//! each other in one step are still caught.
//!
//! The built-in engine does not generate fragments: every collision merges
//! the pair into one body that conserves
//! - total `G*m`
//! - total momentum
//! - volume, so `r = (r_a^3 + r_b^3)^(1/3)`
//!
//! The more massive body keeps its name and slot.

use std::collections::HashSet;

use crate::simulation::states::{Body3, System3, NVec3};

/// A pair of bodies found in contact
#[derive(Debug, Clone)]
pub struct Contact {
    pub a: usize,
    pub b: usize,
    pub separation: f64,
}

/// A resolved collision, as reported in the simulation output
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionRecord {
    pub t: f64,
    pub survivor: String,
    pub absorbed: String,
    pub separation: f64,
}

/// Smallest distance between two points moving linearly from `d0` to `d1`
/// (relative position at the start and end of a step)
pub fn closest_approach(d0: &NVec3, d1: &NVec3) -> f64 {
    let dd = d1 - d0;
    let len2 = dd.norm_squared();
    let s = if len2 > 0.0 {
        (-d0.dot(&dd) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (d0 + s * dd).norm()
}

/// All pairs that touched during the last step, closest first.
/// `prev_x[i]` is the position of body `i` at the start of the step.
pub fn detect_contacts(sys: &System3, prev_x: &[NVec3]) -> Vec<Contact> {
    let n = sys.bodies.len().min(prev_x.len());
    let mut contacts = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            let (bi, bj) = (&sys.bodies[i], &sys.bodies[j]);
            let separation = closest_approach(&(prev_x[j] - prev_x[i]), &(bj.x - bi.x));
            if separation < bi.radius + bj.radius {
                contacts.push(Contact {
                    a: i,
                    b: j,
                    separation,
                });
            }
        }
    }
    contacts.sort_by(|p, q| p.separation.total_cmp(&q.separation));
    contacts
}

/// Merge two bodies, conserving mass, momentum and volume
pub fn merge_bodies(a: &Body3, b: &Body3) -> Body3 {
    let (big, small) = if a.m >= b.m { (a, b) } else { (b, a) };
    let total = big.m + small.m;

    Body3 {
        name: big.name.clone(),
        x: (big.x * big.m + small.x * small.m) / total,
        v: (big.momentum() + small.momentum()) / total,
        m: total,
        radius: (big.radius.powi(3) + small.radius.powi(3)).cbrt(),
        rot: (big.rot * big.m + small.rot * small.m) / total,
    }
}

/// Resolve every contact in `sys`. A body takes part in at most one merger
/// per call; later contacts involving it wait for the next step.
pub fn resolve_collisions(sys: &mut System3, prev_x: &[NVec3]) -> Vec<CollisionRecord> {
    let contacts = detect_contacts(sys, prev_x);
    if contacts.is_empty() {
        return Vec::new();
    }

    let mut consumed: HashSet<usize> = HashSet::new();
    let mut records = Vec::new();

    for c in contacts {
        if consumed.contains(&c.a) || consumed.contains(&c.b) {
            continue;
        }
        let merged = merge_bodies(&sys.bodies[c.a], &sys.bodies[c.b]);
        let (keep, drop) = if sys.bodies[c.a].name == merged.name {
            (c.a, c.b)
        } else {
            (c.b, c.a)
        };

        records.push(CollisionRecord {
            t: sys.t,
            survivor: merged.name.clone(),
            absorbed: sys.bodies[drop].name.clone(),
            separation: c.separation,
        });
        sys.bodies[keep] = merged;
        consumed.insert(c.a);
        consumed.insert(c.b);
    }

    // Names are unique within a run
    let absorbed: HashSet<&str> = records.iter().map(|r| r.absorbed.as_str()).collect();
    sys.bodies.retain(|b| !absorbed.contains(b.name.as_str()));
    records
}
