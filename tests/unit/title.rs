use super::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[test]
fn title_is_cross_then_blocks() {
    let mut rng = StdRng::seed_from_u64(7);
    let t = random_title(&mut rng, 6);
    let chars: Vec<char> = t.chars().collect();
    assert_eq!(chars.len(), 7);
    assert_eq!(chars[0], ORTHODOX_CROSS);
    assert!(chars[1..].iter().all(|c| BLOCKS.contains(c)));
}

#[test]
fn zero_blocks_is_just_the_cross() {
    let mut rng = StdRng::seed_from_u64(1);
    assert_eq!(random_title(&mut rng, 0), "☦");
}

#[test]
fn same_seed_same_title() {
    let a = random_title(&mut StdRng::seed_from_u64(42), 12);
    let b = random_title(&mut StdRng::seed_from_u64(42), 12);
    assert_eq!(a, b);
}
