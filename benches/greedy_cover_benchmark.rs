use criterion::{black_box, criterion_group, criterion_main, Criterion};
use shopping_router::{
    algorithms::{greedy_cover::GreedyCover, CoverSolver},
    models::{CostTable, Item, Location, Store, TargetSet, Waypoint},
};

fn benchmark_greedy_cover(c: &mut Criterion) {
    // Create benchmark data
    let (stores, target, costs) = create_benchmark_data();
    let solver = GreedyCover::new();

    // Benchmark the solve function
    c.bench_function("greedy_cover_solve", |b| {
        b.iter(|| {
            solver.solve(
                black_box(&stores),
                black_box(&target),
                black_box(&costs),
            )
        })
    });

    // Benchmark building the table from coordinates (no provider calls)
    c.bench_function("cost_table_fill", |b| {
        b.iter(|| build_table(black_box(&stores)))
    });
}

fn store_location(i: usize) -> Location {
    Location::new((i % 5) as f64 * 0.01, (i / 5) as f64 * 0.01)
}

fn build_table(stores: &[Store]) -> CostTable {
    let origin = Location::new(0.0, 0.0);
    let mut costs = CostTable::new();
    for (i, a) in stores.iter().enumerate() {
        let wa = Waypoint::store(a.address.as_str());
        costs.insert(&Waypoint::Start, &wa, origin.haversine_miles(&store_location(i)));
        for (j, b) in stores.iter().enumerate().skip(i + 1) {
            let miles = store_location(i).haversine_miles(&store_location(j));
            costs.insert(&wa, &Waypoint::store(b.address.as_str()), miles);
        }
    }
    costs
}

// Create data for benchmarking
fn create_benchmark_data() -> (Vec<Store>, TargetSet, CostTable) {
    // Create 25 stores with different items
    let stores: Vec<Store> = (1..=25)
        .map(|i| {
            let items = (1..=20)
                .filter(|j| j % 5 == i % 5 || j % 7 == i % 7)
                .map(|j| format!("item {}", j));
            Store::new(format!("{} Main St", i), items)
        })
        .collect();

    // Target every item that some store stocks
    let target: TargetSet = (1..=20).map(|j| Item::new(format!("item {}", j))).collect();
    let costs = build_table(&stores);

    (stores, target, costs)
}

criterion_group!(benches, benchmark_greedy_cover);
criterion_main!(benches);
