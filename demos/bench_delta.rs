use std::fs::File;
use std::io::Write;
use std::time::Instant;

use delta_sssp::generate::random_graph;
use delta_sssp::{dijkstra, Executor, GraphStore, Solver};

fn arg<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter().position(|a| a == name).and_then(|i| args.get(i + 1)).map(String::as_str)
}

fn list<T: std::str::FromStr>(raw: &str) -> Vec<T> {
    raw.split(',').filter_map(|s| s.trim().parse().ok()).collect()
}

fn ms(t: Instant) -> f64 { t.elapsed().as_secs_f64() * 1000.0 }

fn run_one(n: usize, avg_degree: f32, multiplier: f32, seed: u64, threads: usize) -> serde_json::Value {
    let edges = random_graph(n, avg_degree, 1.0..5.0, seed);
    let mean = edges.iter().map(|e| e.weight as f64).sum::<f64>() / edges.len().max(1) as f64;
    let delta = (mean as f32 * multiplier).max(1e-4);
    let g = GraphStore::new(n, &edges, delta).expect("graph");

    let t = Instant::now();
    let base = dijkstra(&g, 0).expect("baseline");
    let base_ms = ms(t);

    let t = Instant::now();
    let seq = Solver::new(&g).executor(Executor::Sequential).run(0).expect("sequential");
    let seq_ms = ms(t);

    let pool = Executor::with_threads(threads).expect("pool");
    let t = Instant::now();
    let par = Solver::new(&g).executor(pool).run(0).expect("parallel");
    let par_ms = ms(t);

    for (v, (&a, &b)) in base.distances().iter().zip(par.distances()).enumerate() {
        if a.is_finite() || b.is_finite() {
            assert!((a - b).abs() <= 1e-4 * a.abs().max(1.0), "parity fail at {v}: {a} vs {b}");
        }
    }
    serde_json::json!({
        "n": n, "m": edges.len(), "avg_degree": avg_degree,
        "delta": delta, "multiplier": multiplier, "threads": threads,
        "light_edges": g.light_edge_count(), "heavy_edges": g.heavy_edge_count(),
        "baseline_ms": base_ms, "sequential_ms": seq_ms, "parallel_ms": par_ms,
        "parallel_speedup": base_ms / par_ms.max(1e-9),
        "reached": base.reachable_count(),
        "stats": par.stats,
        "sequential_relaxations": seq.stats.relaxations,
    })
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help") {
        eprintln!("Usage: bench_delta --sizes 10000,100000 --degrees 2,4,8 --mults 0.5,1,3 --threads 4 --seed 42 --out benchmarks/delta.json");
        return;
    }
    let sizes: Vec<usize> = list(arg(&args, "--sizes").unwrap_or("10000,100000"));
    let degrees: Vec<f32> = list(arg(&args, "--degrees").unwrap_or("4"));
    let mults: Vec<f32> = list(arg(&args, "--mults").unwrap_or("0.5,1,3"));
    let threads: usize = arg(&args, "--threads").and_then(|v| v.parse().ok()).unwrap_or(4);
    let seed: u64 = arg(&args, "--seed").and_then(|v| v.parse().ok()).unwrap_or(42);
    let out_path = arg(&args, "--out").unwrap_or("benchmarks/delta.json").to_string();

    let mut results = Vec::new();
    for &n in &sizes {
        for &deg in &degrees {
            for &mult in &mults {
                let row = run_one(n, deg, mult, seed, threads);
                eprintln!("n={n} deg={deg} mult={mult} parallel_ms={:.2}", row["parallel_ms"].as_f64().unwrap_or(0.0));
                results.push(row);
            }
        }
    }
    let json = serde_json::Value::Array(results);
    if let Some(dir) = std::path::Path::new(&out_path).parent() { std::fs::create_dir_all(dir).ok(); }
    let mut f = File::create(&out_path).expect("create out");
    f.write_all(serde_json::to_string_pretty(&json).expect("json").as_bytes()).expect("write out");
    eprintln!("wrote {out_path}");
}
