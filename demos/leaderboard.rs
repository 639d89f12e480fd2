use rankset::{RankSet, RankSetResult};
use tracing::info;

fn main() -> RankSetResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let mut board = RankSet::new(0, 10_000)?;

    board.add("alice", 123);
    board.add("bob", 1234);
    board.add("charles", 12);

    info!(
        player = "bob",
        place = board.rev_rank("bob").map(|r| r + 1).unwrap_or_default(),
        "looked up a single player"
    );

    for (place, (player, score)) in board.rev_range_with_score(0, -1).iter().enumerate() {
        println!("No.{}: {player} ({score})", place + 1);
    }

    let (winner, score) = board.pop_max().expect("board is not empty");
    println!("winner: {winner} with {score}");

    Ok(())
}
