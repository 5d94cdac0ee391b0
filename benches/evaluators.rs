use rocket_casino::games::slots::{Reel, SlotSpin, Symbol};
use rocket_casino::games::{hand_value, BlackjackGame, Card, Deck, PlayerAction, Rank, Suit};
use rocket_casino::parse_bet;

criterion::criterion_main!(benches);
criterion::criterion_group! {
    name = benches;
    config = criterion::Criterion::default()
        .without_plots()
        .noise_threshold(3.0)
        .sample_size(50)
        .measurement_time(std::time::Duration::from_secs(2));
    targets =
        parsing_bet_amounts,
        valuing_blackjack_hands,
        scoring_slot_reels,
        spinning_slot_reels,
        playing_blackjack_hand,
}

fn parsing_bet_amounts(c: &mut criterion::Criterion) {
    let inputs = ["250", "1.5k", "2.5m", "max", "allin", "+40", "1e5", "garbage"];
    c.bench_function("parse a mixed batch of bet strings", |b| {
        b.iter(|| inputs.iter().map(|raw| parse_bet(raw, 1_000_000)).sum::<i64>())
    });
}

fn valuing_blackjack_hands(c: &mut criterion::Criterion) {
    let hand = vec![
        Card::new(Rank::Ace, Suit::Spades),
        Card::new(Rank::Ace, Suit::Hearts),
        Card::new(Rank::Six, Suit::Clubs),
        Card::new(Rank::King, Suit::Diamonds),
    ];
    c.bench_function("value a 4-card hand with two aces", |b| b.iter(|| hand_value(&hand)));
}

fn scoring_slot_reels(c: &mut criterion::Criterion) {
    let reels = [Symbol::Cherry, Symbol::Seven, Symbol::Cherry];
    c.bench_function("resolve a slot spin", |b| b.iter(|| SlotSpin::resolve(reels, 1_000).net));
}

fn spinning_slot_reels(c: &mut criterion::Criterion) {
    let reel = Reel::new().unwrap();
    let mut rng = rand::thread_rng();
    c.bench_function("draw three weighted reels", |b| b.iter(|| reel.spin(&mut rng)));
}

fn playing_blackjack_hand(c: &mut criterion::Criterion) {
    let mut rng = rand::thread_rng();
    c.bench_function("shuffle, deal and stand a blackjack hand", |b| {
        b.iter(|| {
            let mut game = BlackjackGame::deal(Deck::shuffled(&mut rng), 100, false).ok()?;
            game.act(PlayerAction::Stand, 1_000).ok();
            Some(game.net())
        })
    });
}
