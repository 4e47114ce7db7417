use std::slice::Chunks;

/// Делит срез на последовательные части не длиннее `size`.
///
/// Порядок сохраняется, последняя часть может быть короче.
///
/// # Примеры
/// ```ignore
/// let batches: Vec<_> = split_into_batches(&[1, 2, 3, 4, 5], 2)?.collect();
/// assert_eq!(batches, vec![&[1, 2][..], &[3, 4][..], &[5][..]]);
/// ```
pub fn split_into_batches<T>(items: &[T], size: usize) -> anyhow::Result<Chunks<'_, T>> {
    if size == 0 {
        anyhow::bail!("Batch size must be positive");
    }
    Ok(items.chunks(size))
}
