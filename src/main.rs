use qkernel::{Event, PoolKind, Quantum, SimTime, Simulation, SimulationConfig, SimulationContext};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Payload for the demo: a periodic tick on one of several channels.
#[derive(Debug, Clone, Copy)]
struct Tick {
    channel: u32,
    period: u64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let kind = match std::env::args().nth(1).map(|arg| arg.parse::<PoolKind>()) {
        Some(Ok(kind)) => kind,
        Some(Err(e)) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
        None => PoolKind::HashedBucket,
    };

    println!("═══════════════════════════════════════════════════════");
    println!("  qkernel — synchronized channel ticks ({})", kind);
    println!("═══════════════════════════════════════════════════════");

    let ordered = run(PoolKind::Ordered);
    let chosen = run(kind);

    println!("  ordered pool : {} events, trace hash {:016x}", ordered.0, ordered.1);
    println!("  {:<13}: {} events, trace hash {:016x}", kind.to_string(), chosen.0, chosen.1);
    if ordered == chosen {
        println!("  ✓ identical firing order");
    } else {
        println!("  ✗ firing order differs");
        std::process::exit(1);
    }
}

/// Run 64 channels ticking at a handful of shared periods until T=10_000.
/// Returns the number of dispatched events and an FNV-1a hash of the trace.
fn run(kind: PoolKind) -> (u64, u64) {
    let config = SimulationConfig::new(SimTime::ZERO, SimTime::new(10_000))
        .with_pool(kind)
        .with_quantum(Quantum::EXACT);
    let mut sim = match Simulation::new(config) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    for channel in 0..64u32 {
        let period = [10, 20, 25, 50][channel as usize % 4];
        if let Err(e) = sim.schedule(SimTime::new(period), Tick { channel, period }) {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }

    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    let processed = sim.run(&mut |ctx: &mut SimulationContext<'_, Tick>, event: &Event<Tick>| {
        let at = event.at.ticks().to_le_bytes();
        let channel = event.payload.channel.to_le_bytes();
        for byte in at.into_iter().chain(channel) {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        // Past the end of the window the pool refuses; that ends the channel.
        if let Err(e) = ctx.schedule_after(event.payload.period, event.payload) {
            debug!(channel = event.payload.channel, error = %e, "channel stopped");
        }
    });

    (processed, hash)
}
