use bencher::{benchmark_group, benchmark_main, Bencher};
use rxcore::prelude::*;

fn bench_subscribe_dispose(b: &mut Bencher) {
  let scheduler = TestScheduler::new();
  let obs = ObservableBuilder::new()
    .lifetime_scheduler(scheduler.clone())
    .never::<u64, ()>();
  b.iter(|| {
    obs.subscribe_fn(|_| {}).unsubscribe();
    scheduler.flush();
  });
}

fn bench_just(b: &mut Bencher) {
  let obs = ObservableBuilder::new()
    .lifetime_scheduler(TestScheduler::new())
    .just::<u64, ()>(1);
  b.iter(|| obs.subscribe_fn(|v| assert_eq!(v, 1)));
}

fn bench_generate_immediate(b: &mut Bencher) {
  let obs = ObservableBuilder::new()
    .lifetime_scheduler(TestScheduler::new())
    .generate::<u64, (), _, _>(0, |x| (*x < 1000).then(|| x + 1), ImmediateScheduler);
  b.iter(|| obs.subscribe_fn(|_| {}));
}

benchmark_group!(benches, bench_subscribe_dispose, bench_just, bench_generate_immediate);
benchmark_main!(benches);
