use rand::Rng;

/// Leading glyph of every generated title.
pub const ORTHODOX_CROSS: char = '☦';

/// Block-element glyphs that make up the random part of a title.
pub const BLOCKS: [char; 26] = [
    '▀', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█', '▉', '▊', '▋', '▌', '▍', '▎', '▏', '▐', '░', '▒',
    '▔', '▕', '▙', '▚', '▛', '▜', '▟',
];

/// Cross followed by `n_blocks` glyphs drawn uniformly (with replacement) from [`BLOCKS`].
pub fn random_title<R: Rng + ?Sized>(rng: &mut R, n_blocks: usize) -> String {
    let mut out = String::with_capacity((n_blocks + 1) * 3);
    out.push(ORTHODOX_CROSS);
    for _ in 0..n_blocks {
        out.push(BLOCKS[rng.random_range(0..BLOCKS.len())]);
    }
    out
}

#[cfg(test)]
#[path = "../tests/unit/title.rs"]
mod tests;
