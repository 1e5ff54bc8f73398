use dispatch_structs::core::Order;
use std::cmp::Ordering;

/// Value density descending, then id ascending. Densities are compared by
/// cross-multiplication so equal ratios compare equal.
#[inline]
pub fn by_density(a: &Order, b: &Order) -> Ordering {
    let lhs = b.value as u64 * a.weight as u64;
    let rhs = a.value as u64 * b.weight as u64;
    lhs.cmp(&rhs).then_with(|| a.id.cmp(&b.id))
}

/// Fills `out` with the indices of `orders` in density order. The sort is
/// stable, so orders with equal density and id keep their input order.
pub fn sort_by_density(orders: &[Order], out: &mut Vec<usize>) {
    out.clear();
    out.extend(0..orders.len());
    out.sort_by(|&a, &b| by_density(&orders[a], &orders[b]));
}
