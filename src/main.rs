fn main() -> anyhow::Result<()> {
    curewatch_lib::run()
}
