use loadpool::error::AppResult;

fn main() -> AppResult<()> {
    loadpool::entry::run()
}
