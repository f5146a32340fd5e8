//! Automatic light sleep with the push button as a GPIO wake source.

use sleepwake::config::Image;

fn main() -> anyhow::Result<()> {
    sleepwake::firmware::run(Image::LightSleep)
}
