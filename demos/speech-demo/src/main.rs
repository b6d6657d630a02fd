//! Speech and tone demo
//!
//! Drives a BuzzKill board from the Raspberry Pi Pico 2 over I2C. Plays a
//! short triangle-wave note, then switches the board into speech mode and
//! says "hello" every few seconds.
//!
//! # Wiring
//!
//! | Signal    | Pico 2 Pin | Notes              |
//! |-----------|------------|--------------------|
//! | I2C0 SDA  | GP20       | External pull-up   |
//! | I2C0 SCL  | GP21       | External pull-up   |

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp as hal;
use embassy_rp::bind_interrupts;
use embassy_rp::block::ImageDef;
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_time::{Duration, Timer};
use {defmt_rtt as _, panic_probe as _};

use buzzkill_driver::{
    BuzzKill, BuzzKillError, Curve, EnvelopeConfig, Interface, Oscillator, PatchType, Shape,
    DEFAULT_ADDRESS,
};

/// Tell the Boot ROM about our application.
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = hal::block::ImageDef::secure_exe();

bind_interrupts!(struct Irqs {
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
});

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_rp::init(Default::default());

    // --- I2C bus (GP20 = SDA, GP21 = SCL) ---
    let i2c = I2c::new_async(
        p.I2C0,
        p.PIN_21, // SCL
        p.PIN_20, // SDA
        Irqs,
        i2c::Config::default(),
    );

    let mut board = BuzzKill::new().begin_i2c(i2c, DEFAULT_ADDRESS);

    // Start from power-up state in case the board was left running.
    if let Err(e) = board.reset_registers(0).await {
        error!("Reset failed: {}", e);
    }

    // --- Single note on voice 0 ---
    let voice = Oscillator::voice(0);
    let envelope = EnvelopeConfig::from_millis(Curve::Natural, 20, 300, 80, 600, 15, false);

    board
        .set_frequency(voice, 261.6)
        .await
        .expect("Failed to set frequency");
    board
        .set_shape(voice, Shape::Triangle)
        .await
        .expect("Failed to set shape");
    board
        .configure_envelope(0, &envelope)
        .await
        .expect("Failed to configure envelope");
    board
        .enable_voice(0, true)
        .await
        .expect("Failed to enable voice");

    info!("Playing middle C");
    unwrap!(board.note_on(0).await);
    Timer::after(Duration::from_millis(500)).await;
    unwrap!(board.note_off(0).await);
    Timer::after(Duration::from_millis(1000)).await;

    // --- Speech ---
    if let Err(e) = board.prepare_speech_mode(110.0, PatchType::FreqScale).await {
        error!("Speech setup failed: {}", e);
    }

    loop {
        match say_hello(&mut board).await {
            Ok(()) => info!("Speaking"),
            Err(e) => error!("Speech failed: {}", e),
        }

        Timer::after(Duration::from_millis(3000)).await;
    }
}

async fn say_hello<IF: Interface>(board: &mut BuzzKill<IF>) -> Result<(), BuzzKillError<IF::Error>> {
    board.clear_speech_buffer().await?;
    board.add_speech_tags("H*EH LX OW _2.").await?;
    board.start_speaking().await
}
