use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    personabot::cli::main()
}
