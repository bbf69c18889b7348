use delta_sssp::ffi::{sssp_get_bucket_stats, sssp_run_baseline, sssp_run_delta_stepping, SsspBucketStats, SsspResultInfo};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 5 {
        eprintln!("usage: run_one <n> <density> <seed> <mode: baseline|delta|delta_seq> [delta]");
        std::process::exit(1);
    }
    let n: u32 = args[1].parse().expect("n");
    let density: f32 = args[2].parse().expect("density");
    let seed: u64 = args[3].parse().expect("seed");
    let mode = args[4].as_str();
    // <= 0 lets the library pick delta from SSSP_* env settings
    let delta: f32 = args.get(5).map(|d| d.parse().expect("delta")).unwrap_or(0.0);
    if mode == "delta_seq" { std::env::set_var("SSSP_THREADS", "1"); }

    let mut rng = SmallRng::seed_from_u64(seed);
    let deg = density.max(1.0) as usize;
    let mut offsets = Vec::with_capacity(n as usize + 1);
    let mut targets = Vec::with_capacity(n as usize * deg);
    let mut weights = Vec::with_capacity(n as usize * deg);
    offsets.push(0);
    for _u in 0..n {
        for _ in 0..deg { targets.push(rng.gen_range(0..n)); weights.push(rng.gen_range(1.0f32..4.0)); }
        offsets.push(targets.len() as u32);
    }
    let mut dist = vec![0f32; n as usize];
    let mut pred = vec![0i32; n as usize];
    let mut info = SsspResultInfo::default();
    let t0 = std::time::Instant::now();
    let rc = unsafe {
        match mode {
            "baseline" => sssp_run_baseline(n, offsets.as_ptr(), targets.as_ptr(), weights.as_ptr(), 0, dist.as_mut_ptr(), pred.as_mut_ptr(), &mut info),
            "delta" | "delta_seq" => sssp_run_delta_stepping(n, offsets.as_ptr(), targets.as_ptr(), weights.as_ptr(), 0, delta, dist.as_mut_ptr(), pred.as_mut_ptr(), &mut info),
            _ => { eprintln!("bad mode"); return; }
        }
    };
    let ms = t0.elapsed().as_secs_f64() * 1000.0;
    if rc != 0 {
        eprintln!("error {rc}");
        return;
    }
    let reached = dist.iter().filter(|d| d.is_finite()).count();
    print!("mode={mode} n={n} m={} ms={ms:.3} reached={reached} relax={} light={} heavy={} settled={}", targets.len(), info.relaxations, info.light_relaxations, info.heavy_relaxations, info.settled);
    if mode != "baseline" {
        let mut bs = SsspBucketStats::default();
        unsafe { sssp_get_bucket_stats(&mut bs) };
        print!(
            " buckets_visited={} light_pass_repeats={} max_bucket_index={} delta={:.3}",
            bs.buckets_visited,
            bs.light_pass_repeats,
            bs.max_bucket_index,
            bs.delta_x1000 as f32 / 1000.0
        );
    }
    println!();
}
