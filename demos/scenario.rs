//! Seven-vertex walkthrough (delta = 4) with every scheduler event logged at TRACE.

use delta_sssp::{solve_observed, Edge, SsspConfig, TracingObserver};

const NAMES: [char; 7] = ['A', 'B', 'C', 'D', 'E', 'F', 'G'];

fn main() {
    tracing_subscriber::fmt().with_max_level(tracing::Level::TRACE).with_target(true).init();

    let edges: Vec<Edge> = [(0, 1, 3.0), (0, 3, 5.0), (0, 6, 3.0), (0, 4, 3.0), (1, 2, 3.0), (2, 3, 1.0), (4, 5, 5.0)]
        .into_iter()
        .map(|(s, t, w)| Edge::new(s, t, w))
        .collect();
    let observer = TracingObserver { edges: true };
    let paths = match solve_observed(NAMES.len(), &edges, 0, &SsspConfig::with_delta(4.0).threads(1), &observer) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    for (v, name) in NAMES.iter().enumerate() {
        let route: String = paths
            .path_to(v as u32)
            .map(|p| p.iter().map(|&u| NAMES[u as usize].to_string()).collect::<Vec<_>>().join(" -> "))
            .unwrap_or_else(|| "unreachable".into());
        println!("{name}: {:>4}  {route}", paths.distances()[v]);
    }
    println!("{}", serde_json::to_string_pretty(&paths.stats).expect("stats serialize"));
}
