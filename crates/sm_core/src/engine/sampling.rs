//! Cumulative-weight sampling helpers.

use rand::Rng;

/// Cumulative-weight pick over a single uniform draw.
///
/// 음수 가중치는 0 으로 취급. 총합이 0 이면 균등 선택, 비어 있으면 `None`.
pub fn weighted_index<R: Rng + ?Sized>(rng: &mut R, weights: &[f32]) -> Option<usize> {
    if weights.is_empty() {
        return None;
    }
    let total: f32 = weights.iter().map(|w| w.max(0.0)).sum();
    if total <= 0.0 || !total.is_finite() {
        return Some(rng.gen_range(0..weights.len()));
    }

    let draw = rng.gen_range(0.0..total);
    let mut cumulative = 0.0;
    for (i, w) in weights.iter().enumerate() {
        cumulative += w.max(0.0);
        if draw < cumulative {
            return Some(i);
        }
    }
    // 부동소수 오차로 끝까지 온 경우: 마지막 양수 가중치
    weights.iter().rposition(|w| *w > 0.0)
}

/// Pick an item by weight; see [`weighted_index`].
pub fn weighted_choice<'a, T, R, F>(rng: &mut R, items: &'a [T], weight: F) -> Option<&'a T>
where
    R: Rng + ?Sized,
    F: Fn(&T) -> f32,
{
    let weights: Vec<f32> = items.iter().map(weight).collect();
    weighted_index(rng, &weights).map(|i| &items[i])
}

/// Normalize in place so the entries sum to 1. All-zero input becomes uniform.
pub fn normalize(values: &mut [f32]) {
    let total: f32 = values.iter().map(|v| v.max(0.0)).sum();
    if total <= 0.0 {
        let n = values.len().max(1) as f32;
        values.iter_mut().for_each(|v| *v = 1.0 / n);
        return;
    }
    values.iter_mut().for_each(|v| *v = v.max(0.0) / total);
}
