//! Deep-sleep countdown, reset by the push button.

use sleepwake::config::Image;

fn main() -> anyhow::Result<()> {
    sleepwake::firmware::run(Image::DeepSleep)
}
