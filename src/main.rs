use webload::error::AppResult;

fn main() -> AppResult<()> {
    webload::run()
}
