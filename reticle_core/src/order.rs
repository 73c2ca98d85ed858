// Copyright 2026 the Reticle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Full z-offset codec.
//!
//! Every node carries a 16-bit *full z-offset* that totally orders the
//! flattened tree for input and draw dispatch. The key packs two bytes:
//!
//! - **Low byte (outer)**: the signed 8-bit z-offset accumulated down the
//!   parent chain, translated into unsigned range by adding 128 so that the
//!   order stays monotonic across the sign boundary.
//! - **High byte (inner)**: an unsigned layer counter reserved for
//!   separating internal structures (floating windows and the like). It
//!   dominates the outer byte.
//!
//! A child's key is derived from its parent's already-computed key. Both
//! bytes wrap on overflow; ordering is only meaningful among siblings of the
//! same parent, so overflow is accepted rather than reported.

/// The parent key used for nodes without a parent: zero outer offset, zero
/// inner offset.
pub const ROOT_KEY: u16 = 0x0080;

/// Computes a node's full z-offset from its local offsets and its parent's
/// full z-offset.
///
/// Siblings with equal local offsets produce equal keys and are ordered by
/// their position in the flattened list.
#[inline]
#[must_use]
pub const fn full_z_offset(z_offset: i8, inner_z_offset: u8, parent: u16) -> u16 {
    let [parent_outer, parent_inner] = parent.to_le_bytes();
    let outer = parent_outer.wrapping_add(z_offset.cast_unsigned());
    let inner = parent_inner.wrapping_add(inner_z_offset);
    u16::from_le_bytes([outer, inner])
}

/// Returns the accumulated signed outer offset stored in `key`.
#[inline]
#[must_use]
pub const fn outer_z_offset(key: u16) -> i8 {
    let [outer, _] = key.to_le_bytes();
    (outer ^ 0x80).cast_signed()
}

/// Returns the accumulated inner offset stored in `key`.
#[inline]
#[must_use]
pub const fn inner_z_offset(key: u16) -> u8 {
    let [_, inner] = key.to_le_bytes();
    inner
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unparented_zero_is_neutral() {
        assert_eq!(full_z_offset(0, 0, ROOT_KEY), ROOT_KEY);
        assert_eq!(outer_z_offset(ROOT_KEY), 0);
        assert_eq!(inner_z_offset(ROOT_KEY), 0);
    }

    #[test]
    fn higher_sibling_sorts_above_lower_sibling() {
        let x = full_z_offset(5, 0, ROOT_KEY);
        let y = full_z_offset(-3, 0, ROOT_KEY);
        assert!(x > y, "x={x:#06x} y={y:#06x}");
    }

    #[test]
    fn ordering_is_monotonic_across_sign_boundary() {
        let keys: alloc::vec::Vec<u16> = (-4_i8..=4)
            .map(|z| full_z_offset(z, 0, ROOT_KEY))
            .collect();
        assert!(
            keys.windows(2).all(|w| w[0] < w[1]),
            "keys not increasing: {keys:?}"
        );
    }

    #[test]
    fn child_accumulates_parent_outer_offset() {
        let parent = full_z_offset(3, 0, ROOT_KEY);
        let child = full_z_offset(2, 0, parent);
        assert_eq!(outer_z_offset(child), 5);
    }

    #[test]
    fn inner_offset_dominates_outer() {
        let low_inner_high_outer = full_z_offset(100, 0, ROOT_KEY);
        let high_inner_low_outer = full_z_offset(-100, 1, ROOT_KEY);
        assert!(high_inner_low_outer > low_inner_high_outer);
        assert_eq!(inner_z_offset(high_inner_low_outer), 1);
    }

    #[test]
    fn overflow_wraps_instead_of_failing() {
        let parent = full_z_offset(127, 255, ROOT_KEY);
        let child = full_z_offset(1, 1, parent);
        assert_eq!(outer_z_offset(child), i8::MIN);
        assert_eq!(inner_z_offset(child), 0);
    }
}
