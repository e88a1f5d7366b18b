use crate::models::Tower;
use tracing::info;

/// Sort towers by serial, drop the ones without a geodetically valid
/// position, and return the survivors alongside their (lon, lat) pairs in
/// matching order. Sorting first makes the output deterministic and
/// independent of registry fetch order.
///
/// Zero valid towers is a legitimate outcome; the caller short-circuits
/// with an empty batch.
pub fn filter_valid(towers: &[Tower]) -> (Vec<Tower>, Vec<(f64, f64)>) {
    let mut sorted: Vec<&Tower> = towers.iter().collect();
    sorted.sort_by(|a, b| a.serial.cmp(&b.serial));

    let mut valid = Vec::new();
    let mut coords = Vec::new();
    let mut invalid_count = 0usize;

    for tower in sorted {
        match tower.sampling_coords() {
            Some(pair) => {
                valid.push(tower.clone());
                coords.push(pair);
            }
            None => invalid_count += 1,
        }
    }

    info!(
        total = towers.len(),
        invalid = invalid_count,
        valid = valid.len(),
        "filtered tower coordinates"
    );

    (valid, coords)
}
