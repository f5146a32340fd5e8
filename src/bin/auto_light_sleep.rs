//! Automatic light sleep only. The button interrupts but never wakes the chip.

use sleepwake::config::Image;

fn main() -> anyhow::Result<()> {
    sleepwake::firmware::run(Image::AutoLightSleep)
}
