fn main() -> anyhow::Result<()> {
    eqtutor_lib::run()
}
