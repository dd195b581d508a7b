fn main() -> anyhow::Result<()> {
    logsieve::run()
}
