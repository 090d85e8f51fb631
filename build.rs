use std::env;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use rand_mt::Mt64;

// Ray directions, as (file step, rank step). The order must match
// `Direction` in src/lookup.rs: straight rays first, then diagonals.
const DIRECTIONS: [(i32, i32); 8] = [
    (0, 1),   // north
    (0, -1),  // south
    (1, 0),   // east
    (-1, 0),  // west
    (1, 1),   // north east
    (-1, 1),  // north west
    (1, -1),  // south east
    (-1, -1), // south west
];
const KNIGHT_JUMPS: [(i32, i32); 8] = [
    (1, 2), (2, 1), (2, -1), (1, -2), (-1, -2), (-2, -1), (-2, 1), (-1, 2),
];
const KING_STEPS: [(i32, i32); 8] = [
    (0, 1), (1, 1), (1, 0), (1, -1), (0, -1), (-1, -1), (-1, 0), (-1, 1),
];

fn main() {
    let out_dir = env::var_os("OUT_DIR").unwrap();
    let lookup_file = Path::new(&out_dir).join("lookup.rs");
    let zobrist_file = Path::new(&out_dir).join("zobrist_keys.rs");

    let tables = BuildPreprocessor::process();

    let mut file = File::create(lookup_file).unwrap();
    writeln!(&mut file, "impl Lookup {{").unwrap();
    inject_3d_array(
        &mut file,
        "pub const RAYS: [[[Square; 7]; 8]; 64]",
        &tables.rays,
    );
    inject_2d_array(
        &mut file,
        "pub const RAY_LENGTHS: [[usize; 8]; 64]",
        &tables.ray_lengths,
    );
    inject_2d_array(
        &mut file,
        "pub const KNIGHT_REACH: [[Square; 8]; 64]",
        &tables.knight_reach,
    );
    inject_array(
        &mut file,
        "pub const KNIGHT_REACH_LENGTHS: [usize; 64]",
        &tables.knight_reach_lengths,
    );
    inject_2d_array(
        &mut file,
        "pub const KING_REACH: [[Square; 8]; 64]",
        &tables.king_reach,
    );
    inject_array(
        &mut file,
        "pub const KING_REACH_LENGTHS: [usize; 64]",
        &tables.king_reach_lengths,
    );
    inject_3d_array(
        &mut file,
        "pub const PAWN_CAPTURES: [[[Square; 2]; 64]; 2]",
        &tables.pawn_captures,
    );
    inject_2d_array(
        &mut file,
        "pub const PAWN_CAPTURE_LENGTHS: [[usize; 64]; 2]",
        &tables.pawn_capture_lengths,
    );
    inject_2d_array(
        &mut file,
        "pub const IN_LINE: [[bool; 64]; 64]",
        &tables.in_line,
    );
    writeln!(&mut file, "}}").unwrap();

    file = File::create(zobrist_file).unwrap();
    writeln!(&mut file, "impl ZobristHasher {{").unwrap();
    inject_array(
        &mut file,
        "pub const ZOBRIST_KEYS: [u64; 781]",
        &BuildPreprocessor::initialize_zobrist_keys(),
    );
    writeln!(&mut file, "}}").unwrap();

    println!("cargo:rerun-if-changed=build.rs");
}

fn inject_array<T: ToString>(file: &mut File, declaration: &str, array: &[T]) {
    writeln!(file, "{} = [", declaration).unwrap();
    write_values(file, array);
    writeln!(file, "];").unwrap();
}

fn inject_2d_array<T: ToString>(file: &mut File, declaration: &str, array: &[Vec<T>]) {
    writeln!(file, "{} = [", declaration).unwrap();
    for slice in array {
        write!(file, "[").unwrap();
        write_values(file, slice);
        writeln!(file, "], ").unwrap();
    }
    writeln!(file, "];").unwrap();
}

fn inject_3d_array<T: ToString>(file: &mut File, declaration: &str, array: &[Vec<Vec<T>>]) {
    writeln!(file, "{} = [", declaration).unwrap();
    for plane in array {
        write!(file, "[").unwrap();
        for slice in plane {
            write!(file, "[").unwrap();
            write_values(file, slice);
            write!(file, "], ").unwrap();
        }
        writeln!(file, "], ").unwrap();
    }
    writeln!(file, "];").unwrap();
}

fn write_values<T: ToString>(file: &mut File, values: &[T]) {
    for value in values {
        write!(file, "{}, ", value.to_string()).unwrap();
    }
}

struct BuildPreprocessor {
    pub rays: Vec<Vec<Vec<usize>>>,
    pub ray_lengths: Vec<Vec<usize>>,
    pub knight_reach: Vec<Vec<usize>>,
    pub knight_reach_lengths: Vec<usize>,
    pub king_reach: Vec<Vec<usize>>,
    pub king_reach_lengths: Vec<usize>,
    pub pawn_captures: Vec<Vec<Vec<usize>>>,
    pub pawn_capture_lengths: Vec<Vec<usize>>,
    pub in_line: Vec<Vec<bool>>,
}
impl BuildPreprocessor {
    pub fn process() -> BuildPreprocessor {
        let (rays, ray_lengths) = Self::process_rays();
        let (knight_reach, knight_reach_lengths) = Self::process_jumps(&KNIGHT_JUMPS);
        let (king_reach, king_reach_lengths) = Self::process_jumps(&KING_STEPS);
        let (pawn_captures, pawn_capture_lengths) = Self::process_pawn_captures();
        let in_line = Self::process_in_line(&rays, &ray_lengths);
        BuildPreprocessor {
            rays,
            ray_lengths,
            knight_reach,
            knight_reach_lengths,
            king_reach,
            king_reach_lengths,
            pawn_captures,
            pawn_capture_lengths,
            in_line,
        }
    }

    fn offset(sq: usize, (file_step, rank_step): (i32, i32)) -> Option<usize> {
        let file = (sq % 8) as i32 + file_step;
        let rank = (sq / 8) as i32 + rank_step;
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            Some((rank * 8 + file) as usize)
        } else {
            None
        }
    }

    // Rays are ordered outward from the origin square and padded with
    // zeroes up to 7 entries, the real length lives in the lengths table
    fn process_rays() -> (Vec<Vec<Vec<usize>>>, Vec<Vec<usize>>) {
        let mut rays = vec![];
        let mut lengths = vec![];
        for sq in 0..64 {
            let mut square_rays = vec![];
            let mut square_lengths = vec![];
            for direction in DIRECTIONS {
                let mut ray = vec![];
                let mut current = sq;
                while let Some(next) = Self::offset(current, direction) {
                    ray.push(next);
                    current = next;
                }
                square_lengths.push(ray.len());
                ray.resize(7, 0);
                square_rays.push(ray);
            }
            rays.push(square_rays);
            lengths.push(square_lengths);
        }
        (rays, lengths)
    }

    fn process_jumps(jumps: &[(i32, i32); 8]) -> (Vec<Vec<usize>>, Vec<usize>) {
        let mut reach = vec![];
        let mut lengths = vec![];
        for sq in 0..64 {
            let mut targets: Vec<usize> = jumps
                .iter()
                .filter_map(|jump| Self::offset(sq, *jump))
                .collect();
            lengths.push(targets.len());
            targets.resize(8, 0);
            reach.push(targets);
        }
        (reach, lengths)
    }

    // Indexed by color (black = 0, white = 1), then by the pawn's square
    fn process_pawn_captures() -> (Vec<Vec<Vec<usize>>>, Vec<Vec<usize>>) {
        let mut captures = vec![];
        let mut lengths = vec![];
        for rank_step in [-1, 1] {
            let mut color_captures = vec![];
            let mut color_lengths = vec![];
            for sq in 0..64 {
                let mut targets: Vec<usize> = [(-1, rank_step), (1, rank_step)]
                    .iter()
                    .filter_map(|step| Self::offset(sq, *step))
                    .collect();
                color_lengths.push(targets.len());
                targets.resize(2, 0);
                color_captures.push(targets);
            }
            captures.push(color_captures);
            lengths.push(color_lengths);
        }
        (captures, lengths)
    }

    fn process_in_line(rays: &[Vec<Vec<usize>>], lengths: &[Vec<usize>]) -> Vec<Vec<bool>> {
        let mut in_line = vec![vec![false; 64]; 64];
        for origin in 0..64 {
            for direction in 0..8 {
                for target in &rays[origin][direction][..lengths[origin][direction]] {
                    in_line[origin][*target] = true;
                }
            }
        }
        in_line
    }

    pub fn initialize_zobrist_keys() -> [u64; 781] {
        let mut rng = Mt64::new_unseeded();
        [0u64; 781].map(|_| rng.next_u64())
    }
}
