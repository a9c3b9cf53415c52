//! Collision phase for one group pair.
//!
//! Full cross product: every entity of `group_a` is tested against every
//! entity of `group_b` and the host callback receives them in that order.
//! For a self-pair (`group_a == group_b`) an entity is never paired with
//! itself, but each unordered pair is reported twice, once per argument
//! order. Scripts rely on seeing both sides, so this is kept.
//!
//! A pair matches when both entities have `colli` set, their world masks
//! overlap and the injected geometry predicate reports an intersection.
//! Status is not consulted: an entity marked for removal earlier in the
//! frame still collides until it is reaped.
//!
//! Both cursors prefetch their successor before the callback runs. If the
//! callback moves the current node to another group, the walk resumes from
//! the prefetched node instead of following the node into its new list.

use crate::bridge::host::ScriptHost;
use crate::resources::pool::EntityPool;
use crate::systems::scheduler::FramePhase;

/// Tests every entity of `group_a` against every entity of `group_b`.
///
/// Each match calls [`ScriptHost::on_collision`] with `a` as the current
/// entity. The phase and current entity in force before the call are
/// restored afterwards, so script code may run a pass from inside another
/// callback.
///
/// When a callback clears `a`'s `colli` flag or moves `a` out of
/// `group_a`, the inner walk stops for that `a`; it no longer belongs to
/// the pass.
///
/// Returns the number of callbacks fired.
pub fn run_pass(pool: &mut EntityPool, host: &mut dyn ScriptHost, group_a: u16, group_b: u16) -> usize {
    let saved_phase = pool.phase();
    let saved_current = pool.current();
    pool.set_phase(Some(FramePhase::Collision));

    let mut hits = 0;
    let mut a_cursor = pool.collision_groups().first(group_a);
    while let Some(a) = a_cursor {
        let a_next = pool.collision_groups().next(a);

        let mut b_cursor = pool.collision_groups().first(group_b);
        while let Some(b) = b_cursor {
            let b_next = pool.collision_groups().next(b);
            if a != b && matches(pool, a, b) {
                let ha = pool.handle_at(a);
                let hb = pool.handle_at(b);
                pool.set_current(Some(ha));
                host.on_collision(pool, ha, hb);
                pool.set_current(None);
                hits += 1;

                if !pool.record_at(a).colli || pool.collision_groups().group_of(a) != Some(group_a) {
                    break;
                }
            }
            b_cursor = advance(pool, group_b, b, b_next);
        }

        a_cursor = advance(pool, group_a, a, a_next);
    }

    pool.set_phase(saved_phase);
    pool.set_current(saved_current);
    hits
}

fn matches(pool: &EntityPool, a: u32, b: u32) -> bool {
    let ra = pool.record_at(a);
    let rb = pool.record_at(b);
    ra.colli && rb.colli && pool.collides(ra, rb, false)
}

fn advance(pool: &EntityPool, group: u16, node: u32, prefetched: Option<u32>) -> Option<u32> {
    let groups = pool.collision_groups();
    if groups.group_of(node) == Some(group) {
        groups.next(node)
    } else {
        prefetched.filter(|&n| groups.group_of(n) == Some(group))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::class::ClassDescriptor;
    use crate::components::collider::Collider;
    use crate::components::handle::Handle;
    use crate::resources::poolconfig::PoolConfig;

    #[derive(Default)]
    struct Pairs(Vec<(Handle, Handle)>);

    impl ScriptHost for Pairs {
        fn on_collision(&mut self, _pool: &mut EntityPool, a: Handle, b: Handle) {
            self.0.push((a, b));
        }
    }

    fn ball(group: u16, x: f64) -> ClassDescriptor {
        ClassDescriptor::new()
            .with_group(group)
            .with_position(x, 0.0)
            .with_collider(Collider::circle(1.0))
    }

    #[test]
    fn cross_pair_reports_group_a_first() {
        let mut pool = EntityPool::new(PoolConfig::new().with_capacity(8).with_groups(2));
        let player = pool.allocate(&ball(0, 0.0)).unwrap();
        let bullet = pool.allocate(&ball(1, 0.5)).unwrap();
        let _far = pool.allocate(&ball(1, 50.0)).unwrap();

        let mut host = Pairs::default();
        assert_eq!(run_pass(&mut pool, &mut host, 0, 1), 1);
        assert_eq!(host.0, vec![(player, bullet)]);
    }

    #[test]
    fn colli_flag_and_world_mask_filter_pairs() {
        let mut pool = EntityPool::new(PoolConfig::new().with_capacity(8).with_groups(2));
        let a = pool.allocate(&ball(0, 0.0)).unwrap();
        let _b = pool.allocate(&ball(1, 0.0).with_colli(false)).unwrap();
        let c = pool.allocate(&ball(1, 0.0)).unwrap();
        pool.get_mut(c).unwrap().world_mask = crate::components::worldmask::WorldMask(2);

        let mut host = Pairs::default();
        assert_eq!(run_pass(&mut pool, &mut host, 0, 1), 0);
        assert!(pool.check_collision(a, c, true).unwrap());
    }

    #[test]
    fn phase_and_current_are_restored() {
        let mut pool = EntityPool::new(PoolConfig::new().with_capacity(2).with_groups(1));
        let h = pool.allocate(&ball(0, 0.0)).unwrap();
        pool.set_phase(Some(FramePhase::Update));
        pool.set_current(Some(h));
        run_pass(&mut pool, &mut Pairs::default(), 0, 0);
        assert_eq!(pool.phase(), Some(FramePhase::Update));
        assert_eq!(pool.current(), Some(h));
    }
}
