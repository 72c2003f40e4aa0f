fn main() -> Result<(), Box<dyn std::error::Error>> {
    ferret::cli::main()
}
